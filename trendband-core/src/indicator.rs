//! Trend indicator trait.
//!
//! Indicators are pure functions: a validated bar series in, a fresh
//! `IndicatorResult` of the same length out. Nothing is cached between
//! calls and the input series is never modified.

use crate::domain::Series;
use crate::error::IndicatorError;
use crate::indicators::IndicatorResult;

/// A band-and-direction indicator over a whole series.
///
/// # Look-ahead contamination guard
/// No output at bar t may depend on price data from bar t+1 or later.
/// Every implementation must pass the truncated-vs-full series test.
pub trait TrendIndicator: Send + Sync {
    /// Human-readable name (e.g., "supertrend_hl2_10_3").
    fn name(&self) -> &str;

    /// Index of the first bar with a defined output. Earlier slots hold
    /// the `0.0` / `Undetermined` sentinel.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire series.
    fn compute(&self, series: &Series) -> Result<IndicatorResult, IndicatorError>;
}
