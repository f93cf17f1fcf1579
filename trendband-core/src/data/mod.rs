//! Ingestion boundary: raw records and CSV in, validated `Series` out.

pub mod canonicalize;
pub mod csv_source;
pub mod schema;
pub mod synthetic;

pub use canonicalize::{canonicalize, CanonicalizeError, CanonicalizeOptions, RawRecord};
pub use csv_source::{read_csv, read_csv_path, write_csv, CsvSourceError};
pub use schema::{ColumnIndex, SchemaDescriptor, SchemaError};
pub use synthetic::generate_series;
