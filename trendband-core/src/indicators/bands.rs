//! Hysteresis bands: an ATR channel around the center that ratchets.
//!
//! Raw candidates each bar: `center ± multiplier * atr`.
//!
//! Ratchet rule, given the previous band and previous close:
//! - lower takes the raw value if it is higher, or if the previous close
//!   fell below the previous lower; otherwise it holds.
//! - upper takes the raw value if it is lower, or if the previous close
//!   rose above the previous upper; otherwise it holds.
//!
//! So while price stays inside, lower only rises and upper only falls.
//! `BandState[i]` reads only `BandState[i-1]`, `close[i-1]`, `center[i]`
//! and `atr[i]`.

use serde::{Deserialize, Serialize};

use crate::error::{require_multiplier, IndicatorError};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BandState {
    pub upper: f64,
    pub lower: f64,
}

impl BandState {
    pub fn new(upper: f64, lower: f64) -> Self {
        Self { upper, lower }
    }

    /// Unratcheted candidate band for one bar.
    pub fn raw(center: f64, atr: f64, multiplier: f64) -> Self {
        let offset = multiplier * atr;
        Self {
            upper: center + offset,
            lower: center - offset,
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Apply the ratchet to one bar.
pub fn ratchet(prev: BandState, raw: BandState, prev_close: f64) -> BandState {
    let lower = if raw.lower > prev.lower || prev_close < prev.lower {
        raw.lower
    } else {
        prev.lower
    };
    let upper = if raw.upper < prev.upper || prev_close > prev.upper {
        raw.upper
    } else {
        prev.upper
    };
    BandState { upper, lower }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisBandEngine {
    multiplier: f64,
}

impl HysteresisBandEngine {
    pub fn new(multiplier: f64) -> Result<Self, IndicatorError> {
        require_multiplier(multiplier)?;
        Ok(Self { multiplier })
    }

    /// Ratcheted bands for every bar. Slots before `start` hold the zero
    /// sentinel; bar `start` is seeded from its raw candidates.
    pub fn bands(
        &self,
        center: &[f64],
        atr: &[f64],
        closes: &[f64],
        start: usize,
    ) -> Result<Vec<BandState>, IndicatorError> {
        let n = center.len();
        if atr.len() != n || closes.len() != n {
            return Err(IndicatorError::invalid(
                "bands",
                format!(
                    "length mismatch: center={n}, atr={}, closes={}",
                    atr.len(),
                    closes.len()
                ),
            ));
        }
        if start >= n {
            return Err(IndicatorError::insufficient(start + 1, n));
        }

        let mut out = vec![BandState::default(); n];
        out[start] = BandState::raw(center[start], atr[start], self.multiplier);

        for i in (start + 1)..n {
            let raw = BandState::raw(center[i], atr[i], self.multiplier);
            out[i] = ratchet(out[i - 1], raw, closes[i - 1]);
        }

        Ok(out)
    }
}
