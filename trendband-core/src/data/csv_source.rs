//! CSV in and out.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::data::canonicalize::{canonicalize, CanonicalizeError, CanonicalizeOptions, RawRecord};
use crate::data::schema::{SchemaDescriptor, SchemaError};
use crate::domain::Series;
use crate::parallel::WorkerPool;

#[derive(Debug, thiserror::Error)]
pub enum CsvSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid data: {0}")]
    Canonicalize(#[from] CanonicalizeError),
}

/// Read a headed CSV into a series.
///
/// With `schema: None` the columns are detected from the header row.
pub fn read_csv<R: Read>(
    reader: R,
    schema: Option<&SchemaDescriptor>,
    options: &CanonicalizeOptions,
    parallel: &WorkerPool,
) -> Result<Series, CsvSourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let detected;
    let schema = match schema {
        Some(s) => s,
        None => {
            detected = SchemaDescriptor::detect(&headers)?;
            tracing::debug!(?detected, "detected csv schema");
            &detected
        }
    };
    let idx = schema.resolve(&headers)?;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).unwrap_or("");
        records.push(
            RawRecord::new()
                .with(schema.timestamp.as_str(), cell(idx.timestamp))
                .with(schema.open.as_str(), cell(idx.open))
                .with(schema.high.as_str(), cell(idx.high))
                .with(schema.low.as_str(), cell(idx.low))
                .with(schema.close.as_str(), cell(idx.close))
                .with(schema.volume.as_str(), cell(idx.volume)),
        );
    }

    Ok(canonicalize(&records, schema, options, parallel)?)
}

pub fn read_csv_path(
    path: &Path,
    schema: Option<&SchemaDescriptor>,
    options: &CanonicalizeOptions,
    parallel: &WorkerPool,
) -> Result<Series, CsvSourceError> {
    let file = File::open(path)?;
    read_csv(file, schema, options, parallel)
}

/// Write a series with `timestamp,open,high,low,close,volume` headers.
pub fn write_csv<W: Write>(writer: W, series: &Series) -> Result<(), CsvSourceError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for bar in series {
        wtr.serialize(bar)?;
    }
    wtr.flush()?;
    Ok(())
}
