//! Raw records → validated `Series`.
//!
//! Every field arrives as a string. Prices and volume are parsed as `f64`;
//! timestamps as an integer, a float (truncated, must fit in `i64`), or an
//! RFC 3339 string (converted to epoch milliseconds). A row with a missing,
//! unparseable or non-finite field rejects the whole batch and the error
//! names the 1-based row. Rows are parsed on the pool above the configured size.

use chrono::DateTime;

use crate::data::schema::SchemaDescriptor;
use crate::domain::{Bar, Series};
use crate::error::IndicatorError;
use crate::parallel::{par_try_map, WorkerPool};

/// One source row as `(column, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((column.into(), value.into()));
        self
    }

    /// Value of `column`, if present and non-blank.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanonicalizeOptions {
    /// Discard the final record, typically a bar that is still forming.
    pub drop_last: bool,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanonicalizeError {
    #[error("no bar data")]
    Empty,

    #[error("row {row}: missing field '{column}'")]
    MissingField { row: usize, column: String },

    #[error("row {row}: cannot parse '{value}' in column '{column}'")]
    Unparseable {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: non-finite value in column '{column}'")]
    NonFinite { row: usize, column: String },

    #[error(transparent)]
    Series(#[from] IndicatorError),
}

/// Parse and validate `records` into a series.
pub fn canonicalize(
    records: &[RawRecord],
    schema: &SchemaDescriptor,
    options: &CanonicalizeOptions,
    parallel: &WorkerPool,
) -> Result<Series, CanonicalizeError> {
    let len = if options.drop_last {
        records.len().saturating_sub(1)
    } else {
        records.len()
    };
    if len == 0 {
        return Err(CanonicalizeError::Empty);
    }

    let bars = par_try_map(&records[..len], parallel, |i, record| {
        parse_record(i + 1, record, schema)
    })?;

    let insane = bars.iter().filter(|b| !b.is_sane()).count();
    if insane > 0 {
        tracing::warn!(rows = insane, "bars with high < low or prices outside [low, high]");
    }
    tracing::debug!(rows = len, dropped_last = options.drop_last, "canonicalized");

    Ok(Series::new(bars)?)
}

fn parse_record(
    row: usize,
    record: &RawRecord,
    schema: &SchemaDescriptor,
) -> Result<Bar, CanonicalizeError> {
    let timestamp = parse_timestamp(row, &schema.timestamp, field(row, record, &schema.timestamp)?)?;
    let price = |column: &str| -> Result<f64, CanonicalizeError> {
        parse_number(row, column, field(row, record, column)?)
    };
    Ok(Bar::new(
        timestamp,
        price(&schema.open)?,
        price(&schema.high)?,
        price(&schema.low)?,
        price(&schema.close)?,
        price(&schema.volume)?,
    ))
}

fn field<'a>(row: usize, record: &'a RawRecord, column: &str) -> Result<&'a str, CanonicalizeError> {
    record.get(column).ok_or_else(|| CanonicalizeError::MissingField {
        row,
        column: column.to_string(),
    })
}

fn parse_number(row: usize, column: &str, value: &str) -> Result<f64, CanonicalizeError> {
    let v: f64 = value.parse().map_err(|_| CanonicalizeError::Unparseable {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })?;
    if !v.is_finite() {
        return Err(CanonicalizeError::NonFinite {
            row,
            column: column.to_string(),
        });
    }
    Ok(v)
}

fn parse_timestamp(row: usize, column: &str, value: &str) -> Result<i64, CanonicalizeError> {
    if let Ok(t) = value.parse::<i64>() {
        return Ok(t);
    }
    if let Ok(t) = value.parse::<f64>() {
        // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
        if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
            return Ok(t as i64);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }
    Err(CanonicalizeError::Unparseable {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}
