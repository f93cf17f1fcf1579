//! Zero-on-error style helpers for callers that want a single number.
//!
//! These sit on top of the fallible API and swallow its errors into a
//! caller-chosen default. Nothing else in the crate calls them.

use crate::config::SupertrendConfig;
use crate::domain::Series;
use crate::indicators::supertrend::compute_supertrend;

/// Bars per unit of `atr_period` used when no window is given.
pub const DEFAULT_LOOKBACK_FACTOR: usize = 14;

/// Latest published value, computed over the trailing `lookback_bars`
/// (default `14 * atr_period`). Uses the whole series when it is shorter
/// than the window. Returns `default` if the computation fails.
pub fn latest_value_or(
    series: &Series,
    config: &SupertrendConfig,
    lookback_bars: Option<usize>,
    default: f64,
) -> f64 {
    let window = lookback_bars.unwrap_or(DEFAULT_LOOKBACK_FACTOR * config.atr_period as usize);
    let computed = if window > 0 && window < series.len() {
        series
            .tail(window)
            .and_then(|tail| compute_supertrend(&tail, config))
    } else {
        compute_supertrend(series, config)
    };

    match computed {
        Ok(result) => result.latest().map_or(default, |r| r.value),
        Err(e) => {
            tracing::debug!(error = %e, default, "supertrend failed, using default");
            default
        }
    }
}
