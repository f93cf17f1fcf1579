//! Column mapping for raw bar records.
//!
//! A `SchemaDescriptor` names the source column for each canonical field.
//! Callers build one explicitly or detect it once from a header row; it is
//! then passed by reference to every ingestion call. Nothing is cached
//! globally.

use serde::{Deserialize, Serialize};

pub const TIMESTAMP_CANDIDATES: &[&str] = &[
    "StartTime",
    "OpenTime",
    "Time",
    "t",
    "T",
    "Timestamp",
    "OpenAt",
    "EventTime",
];
pub const OPEN_CANDIDATES: &[&str] = &["Open", "OpenPrice", "O", "o"];
pub const HIGH_CANDIDATES: &[&str] = &["High", "HighPrice", "H", "h"];
pub const LOW_CANDIDATES: &[&str] = &["Low", "LowPrice", "L", "l"];
pub const CLOSE_CANDIDATES: &[&str] = &["Close", "ClosePrice", "C", "c"];
pub const VOLUME_CANDIDATES: &[&str] = &["Volume", "Vol", "V", "v", "Amount", "Quantity"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column for {field}: tried {candidates}")]
    MissingColumn {
        field: &'static str,
        candidates: String,
    },

    #[error("Column '{column}' mapped to {field} is not in the header row")]
    UnknownColumn { field: &'static str, column: String },
}

/// Source column name for each canonical bar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub timestamp: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

/// Header positions resolved from a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub timestamp: usize,
    pub open: usize,
    pub high: usize,
    pub low: usize,
    pub close: usize,
    pub volume: usize,
}

impl SchemaDescriptor {
    pub fn new(
        timestamp: impl Into<String>,
        open: impl Into<String>,
        high: impl Into<String>,
        low: impl Into<String>,
        close: impl Into<String>,
        volume: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            open: open.into(),
            high: high.into(),
            low: low.into(),
            close: close.into(),
            volume: volume.into(),
        }
    }

    /// Pick a column for every field from the accepted candidate names.
    ///
    /// Candidates are tried in order with an exact match first. Multi-letter
    /// candidates then fall back to an ASCII case-insensitive match, so
    /// `timestamp` or `CLOSE` are found too. Single-letter names stay
    /// case-sensitive because `t`/`T` and friends are distinct in some feeds.
    pub fn detect<S: AsRef<str>>(headers: &[S]) -> Result<Self, SchemaError> {
        Ok(Self {
            timestamp: find_column(headers, "timestamp", TIMESTAMP_CANDIDATES)?,
            open: find_column(headers, "open", OPEN_CANDIDATES)?,
            high: find_column(headers, "high", HIGH_CANDIDATES)?,
            low: find_column(headers, "low", LOW_CANDIDATES)?,
            close: find_column(headers, "close", CLOSE_CANDIDATES)?,
            volume: find_column(headers, "volume", VOLUME_CANDIDATES)?,
        })
    }

    /// Positions of the mapped columns within `headers`.
    pub fn resolve<S: AsRef<str>>(&self, headers: &[S]) -> Result<ColumnIndex, SchemaError> {
        let position = |field: &'static str, column: &str| {
            headers
                .iter()
                .position(|h| h.as_ref() == column)
                .ok_or_else(|| SchemaError::UnknownColumn {
                    field,
                    column: column.to_string(),
                })
        };
        Ok(ColumnIndex {
            timestamp: position("timestamp", &self.timestamp)?,
            open: position("open", &self.open)?,
            high: position("high", &self.high)?,
            low: position("low", &self.low)?,
            close: position("close", &self.close)?,
            volume: position("volume", &self.volume)?,
        })
    }
}

fn find_column<S: AsRef<str>>(
    headers: &[S],
    field: &'static str,
    candidates: &[&str],
) -> Result<String, SchemaError> {
    for candidate in candidates {
        if let Some(h) = headers.iter().find(|h| h.as_ref() == *candidate) {
            return Ok(h.as_ref().to_string());
        }
    }
    for candidate in candidates.iter().filter(|c| c.len() > 1) {
        if let Some(h) = headers
            .iter()
            .find(|h| h.as_ref().eq_ignore_ascii_case(candidate))
        {
            return Ok(h.as_ref().to_string());
        }
    }
    Err(SchemaError::MissingColumn {
        field,
        candidates: candidates.join(", "),
    })
}
