//! Reference midline the bands ratchet around.
//!
//! - HL2: `center[i] = (high[i] + low[i]) / 2`, stateless per bar.
//! - Pivot: damped running average of confirmed pivot midpoints. The first
//!   confirmed pivot sets the center; each later one moves it a third of the
//!   way, `center = (2 * center + midpoint) / 3`. Until a pivot has been
//!   confirmed the center is the bar's own HL2.
//!
//! The pivot center lags by `pivot_period` bars because a pivot needs its
//! right-hand window to close before it is known.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::error::IndicatorError;
use crate::indicators::pivot::PivotDetector;
use crate::parallel::{par_fill, WorkerPool};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CenterPolicy {
    #[default]
    Hl2,
    Pivot { pivot_period: u32 },
}

impl CenterPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            CenterPolicy::Hl2 => "hl2",
            CenterPolicy::Pivot { .. } => "pivot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterEstimator {
    policy: CenterPolicy,
}

impl CenterEstimator {
    pub fn new(policy: CenterPolicy) -> Self {
        Self { policy }
    }

    pub fn estimate(
        &self,
        bars: &[Bar],
        parallel: &WorkerPool,
    ) -> Result<Vec<f64>, IndicatorError> {
        match self.policy {
            CenterPolicy::Hl2 => Ok(hl2_center(bars, parallel)),
            CenterPolicy::Pivot { pivot_period } => pivot_center(bars, pivot_period),
        }
    }
}

/// Per-bar HL2. Independent slots, so it may run on the pool.
pub fn hl2_center(bars: &[Bar], parallel: &WorkerPool) -> Vec<f64> {
    par_fill(bars.len(), parallel, |i| bars[i].hl2())
}

/// Running pivot-based center. Sequential: each value depends on the last.
pub fn pivot_center(bars: &[Bar], pivot_period: u32) -> Result<Vec<f64>, IndicatorError> {
    let detector = PivotDetector::new(pivot_period)?;
    let mut out = Vec::with_capacity(bars.len());
    let mut center: Option<f64> = None;

    for (t, bar) in bars.iter().enumerate() {
        if let Some(midpoint) = detector.confirmed_at(bars, t).and_then(|p| p.midpoint()) {
            let next = match center {
                None => midpoint,
                Some(c) => (c * 2.0 + midpoint) / 3.0,
            };
            tracing::trace!(bar = t, pivot = t - detector.period(), midpoint, center = next, "pivot confirmed");
            center = Some(next);
        }
        out.push(center.unwrap_or_else(|| bar.hl2()));
    }

    Ok(out)
}
