//! Indicator pipeline stages.
//!
//! Bars flow through `atr` (true range + Wilder smoothing) and `center`
//! (HL2 or pivot midline), which are independent of each other, then
//! through `bands` (hysteresis ratchet) and `trend` (direction state
//! machine), which are strictly sequential. `supertrend` wires the stages
//! together and `result` holds the output.

pub mod atr;
pub mod bands;
pub mod center;
pub mod pivot;
pub mod result;
pub mod smoother;
pub mod supertrend;
pub mod trend;

pub use atr::{atr, true_range, AtrSeries};
pub use bands::{BandState, HysteresisBandEngine};
pub use center::{CenterEstimator, CenterPolicy};
pub use pivot::{pivot_breakout, pivot_strength, LatestPivots, Pivot, PivotDetector};
pub use result::{IndicatorResult, LatestReading, DEFAULT_BREAKOUT_THRESHOLD};
pub use smoother::{smooth, SmootherState, SmoothingMode};
pub use supertrend::{compute_supertrend, Supertrend};
pub use trend::TrendStateMachine;

#[cfg(test)]
fn test_timestamp(i: usize) -> i64 {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_millis();
    base + i as i64 * 86_400_000
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Bar::new(test_timestamp(i), open, high, low, close, 1000.0)
        })
        .collect()
}

/// Bars from explicit `(open, high, low, close)` tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| {
            Bar::new(test_timestamp(i), open, high, low, close, 1000.0)
        })
        .collect()
}

/// Bars from `(high, low)` pairs; open and close sit at the midpoint.
#[cfg(test)]
pub fn make_hl_bars(data: &[(f64, f64)]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    data.iter()
        .enumerate()
        .map(|(i, &(high, low))| {
            let mid = (high + low) / 2.0;
            Bar::new(test_timestamp(i), mid, high, low, mid, 1000.0)
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
