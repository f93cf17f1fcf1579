//! True Range and Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|)
//! TR[0] is undefined (no previous close) and holds the 0.0 sentinel.
//! ATR applies Wilder smoothing to TR, so ATR[period] is the first defined value.
//!
//! `AtrSeries` keeps both series together with the volatility readings
//! built on them (regime, change, stop/target offsets, breakouts).

use serde::Serialize;

use crate::domain::Bar;
use crate::error::IndicatorError;
use crate::indicators::bands::BandState;
use crate::indicators::smoother::{smooth, SmoothingMode};
use crate::parallel::{par_fill, WorkerPool};

fn true_range_at(bars: &[Bar], i: usize) -> f64 {
    if i == 0 {
        return 0.0;
    }
    let h = bars[i].high;
    let l = bars[i].low;
    let pc = bars[i - 1].close;
    (h - l).max((h - pc).abs()).max((l - pc).abs())
}

/// Compute the True Range series on the calling thread.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    true_range_with(bars, &WorkerPool::sequential())
}

/// Compute the True Range series, fanning out over the pool for long inputs.
/// Each TR value reads only bars `i` and `i-1`, so slots are independent.
pub fn true_range_with(bars: &[Bar], parallel: &WorkerPool) -> Vec<f64> {
    par_fill(bars.len(), parallel, |i| true_range_at(bars, i))
}

/// Wilder-smoothed ATR. Needs more than `period` bars.
pub fn atr(bars: &[Bar], period: u32) -> Result<Vec<f64>, IndicatorError> {
    atr_with(bars, period, &WorkerPool::sequential())
}

pub fn atr_with(
    bars: &[Bar],
    period: u32,
    parallel: &WorkerPool,
) -> Result<Vec<f64>, IndicatorError> {
    AtrSeries::compute_with(bars, period, parallel).map(AtrSeries::into_values)
}

/// ATR and true range over one input, with at least one defined ATR value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtrSeries {
    values: Vec<f64>,
    true_range: Vec<f64>,
    period: u32,
}

impl AtrSeries {
    pub fn compute(bars: &[Bar], period: u32) -> Result<Self, IndicatorError> {
        Self::compute_with(bars, period, &WorkerPool::sequential())
    }

    pub fn compute_with(
        bars: &[Bar],
        period: u32,
        parallel: &WorkerPool,
    ) -> Result<Self, IndicatorError> {
        crate::error::require_period("atr_period", period)?;
        let required = period as usize + 1;
        if bars.len() < required {
            return Err(IndicatorError::insufficient(required, bars.len()));
        }
        let true_range = true_range_with(bars, parallel);
        let values = smooth(&true_range, period, SmoothingMode::Wilder)?;
        Ok(Self {
            values,
            true_range,
            period,
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn true_range(&self) -> &[f64] {
        &self.true_range
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Latest ATR.
    pub fn value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    pub fn latest_true_range(&self) -> f64 {
        self.true_range[self.true_range.len() - 1]
    }

    /// Defined ATR values, i.e. from index `period` on.
    fn defined(&self) -> &[f64] {
        &self.values[self.period as usize..]
    }

    fn last_two(&self) -> Option<(f64, f64)> {
        match self.defined() {
            [.., prev, last] => Some((*prev, *last)),
            _ => None,
        }
    }

    /// Mean of the last `period` defined ATR values.
    fn recent_mean(&self) -> Option<f64> {
        let defined = self.defined();
        let window = self.period as usize;
        if defined.len() < window {
            return None;
        }
        let tail = &defined[defined.len() - window..];
        Some(tail.iter().sum::<f64>() / window as f64)
    }

    /// Latest ATR above `threshold` times its recent mean.
    pub fn is_volatility_high(&self, threshold: f64) -> bool {
        self.recent_mean()
            .is_some_and(|mean| self.value() > mean * threshold)
    }

    /// Latest ATR below `threshold` times its recent mean.
    pub fn is_volatility_low(&self, threshold: f64) -> bool {
        self.recent_mean()
            .is_some_and(|mean| self.value() < mean * threshold)
    }

    pub fn is_volatility_increasing(&self) -> bool {
        self.last_two().is_some_and(|(prev, last)| last > prev)
    }

    pub fn is_volatility_decreasing(&self) -> bool {
        self.last_two().is_some_and(|(prev, last)| last < prev)
    }

    /// Percent change of the last ATR over the previous one. `None` with a
    /// single defined value or a zero previous ATR.
    pub fn volatility_change(&self) -> Option<f64> {
        let (prev, last) = self.last_two()?;
        if prev == 0.0 {
            return None;
        }
        Some((last - prev) / prev * 100.0)
    }

    /// Latest ATR over its recent mean. `None` until `period` values are
    /// defined or when the mean is zero.
    pub fn volatility_ratio(&self) -> Option<f64> {
        let mean = self.recent_mean()?;
        if mean == 0.0 {
            return None;
        }
        Some(self.value() / mean)
    }

    pub fn stop_loss(&self, price: f64, multiplier: f64) -> f64 {
        price - self.value() * multiplier
    }

    pub fn take_profit(&self, price: f64, multiplier: f64) -> f64 {
        price + self.value() * multiplier
    }

    /// `price ± multiplier * atr`.
    pub fn channel_bounds(&self, price: f64, multiplier: f64) -> BandState {
        BandState::raw(price, self.value(), multiplier)
    }

    /// Move from `prev_price` to `price` larger than the latest ATR.
    pub fn is_breaking_out(&self, price: f64, prev_price: f64) -> bool {
        (price - prev_price).abs() > self.value()
    }
}
