//! Pivot detection over a symmetric window.
//!
//! A pivot high at index `c` means no bar in `[c - p, c + p]` has a strictly
//! higher high (ties count). Pivot low is the mirror on lows.
//!
//! A pivot at `c` can only be known once bar `c + p` has closed, so the
//! causal query is `confirmed_at(t)`, which tests candidate `c = t - p` and
//! never reads past bar `t`.

use crate::domain::{Bar, Series};
use crate::error::{require_period, IndicatorError};

/// A pivot confirmed at some bar. Either side may be present, or both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    /// Bar index of the extremum itself (not of its confirmation).
    pub index: usize,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl Pivot {
    /// Average of both sides if both confirmed, else whichever did.
    pub fn midpoint(&self) -> Option<f64> {
        match (self.high, self.low) {
            (Some(h), Some(l)) => Some((h + l) / 2.0),
            (Some(h), None) => Some(h),
            (None, Some(l)) => Some(l),
            (None, None) => None,
        }
    }
}

/// Most recent confirmed pivot high and low, tracked separately.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LatestPivots {
    /// `(index, high)` of the latest confirmed pivot high.
    pub high: Option<(usize, f64)>,
    /// `(index, low)` of the latest confirmed pivot low.
    pub low: Option<(usize, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotDetector {
    period: usize,
}

impl PivotDetector {
    pub fn new(period: u32) -> Result<Self, IndicatorError> {
        require_period("pivot_period", period)?;
        Ok(Self {
            period: period as usize,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    fn window(&self, len: usize, index: usize) -> Option<std::ops::RangeInclusive<usize>> {
        if index < self.period || index + self.period >= len {
            return None;
        }
        Some(index - self.period..=index + self.period)
    }

    /// `high[index]` if it is the maximum high of its full window.
    pub fn pivot_high(&self, bars: &[Bar], index: usize) -> Option<f64> {
        let window = self.window(bars.len(), index)?;
        let h = bars[index].high;
        if bars[window].iter().any(|b| b.high > h) {
            return None;
        }
        Some(h)
    }

    /// `low[index]` if it is the minimum low of its full window.
    pub fn pivot_low(&self, bars: &[Bar], index: usize) -> Option<f64> {
        let window = self.window(bars.len(), index)?;
        let l = bars[index].low;
        if bars[window].iter().any(|b| b.low < l) {
            return None;
        }
        Some(l)
    }

    /// Pivot whose window closes exactly at bar `t`. Reads `bars[..=t]` only.
    pub fn confirmed_at(&self, bars: &[Bar], t: usize) -> Option<Pivot> {
        if t >= bars.len() || t < self.period {
            return None;
        }
        let visible = &bars[..=t];
        let candidate = t - self.period;
        let high = self.pivot_high(visible, candidate);
        let low = self.pivot_low(visible, candidate);
        if high.is_none() && low.is_none() {
            return None;
        }
        Some(Pivot {
            index: candidate,
            high,
            low,
        })
    }

    /// Latest pivot high and low confirmed anywhere in `bars`.
    pub fn latest_confirmed(&self, bars: &[Bar]) -> LatestPivots {
        let mut latest = LatestPivots::default();
        for t in 0..bars.len() {
            if let Some(p) = self.confirmed_at(bars, t) {
                if let Some(h) = p.high {
                    latest.high = Some((p.index, h));
                }
                if let Some(l) = p.low {
                    latest.low = Some((p.index, l));
                }
            }
        }
        latest
    }
}

/// True when the last close is above the latest confirmed pivot high or
/// below the latest confirmed pivot low.
pub fn pivot_breakout(series: &Series, pivot_period: u32) -> Result<bool, IndicatorError> {
    let detector = PivotDetector::new(pivot_period)?;
    let latest = detector.latest_confirmed(series.bars());
    let close = series.last().close;
    let above = latest.high.is_some_and(|(_, h)| close > h);
    let below = latest.low.is_some_and(|(_, l)| close < l);
    Ok(above || below)
}

/// Distance between the latest confirmed pivot high and pivot low, or 0.0
/// when either is missing.
pub fn pivot_strength(series: &Series, pivot_period: u32) -> Result<f64, IndicatorError> {
    let detector = PivotDetector::new(pivot_period)?;
    let latest = detector.latest_confirmed(series.bars());
    Ok(match (latest.high, latest.low) {
        (Some((_, h)), Some((_, l))) => h - l,
        _ => 0.0,
    })
}
