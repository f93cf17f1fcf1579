//! Domain types: bars, series, trend labels.

pub mod bar;
pub mod series;
pub mod trend;

pub use bar::Bar;
pub use series::Series;
pub use trend::TrendDirection;
