//! Trend state machine over ratcheted bands.
//!
//! From `Up`: flip to `Down` only on `close < lower` (strict).
//! From `Down` or `Undetermined`: `Up` only on `close > upper` (strict),
//! otherwise `Down`.
//!
//! Published value is the active trailing line: `lower` in an uptrend,
//! `upper` in a downtrend.

use crate::domain::TrendDirection;
use crate::error::IndicatorError;
use crate::indicators::bands::BandState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendStateMachine;

impl TrendStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// One transition.
    pub fn step(&self, prev: TrendDirection, close: f64, band: BandState) -> TrendDirection {
        match prev {
            TrendDirection::Up => {
                if close < band.lower {
                    TrendDirection::Down
                } else {
                    TrendDirection::Up
                }
            }
            TrendDirection::Down | TrendDirection::Undetermined => {
                if close > band.upper {
                    TrendDirection::Up
                } else {
                    TrendDirection::Down
                }
            }
        }
    }

    /// Active trailing line for a direction. Zero sentinel when undetermined.
    pub fn published_value(&self, direction: TrendDirection, band: BandState) -> f64 {
        match direction {
            TrendDirection::Up => band.lower,
            TrendDirection::Down => band.upper,
            TrendDirection::Undetermined => 0.0,
        }
    }

    /// Run the machine from `start`. Bars before it stay `Undetermined` / 0.0.
    pub fn resolve(
        &self,
        closes: &[f64],
        bands: &[BandState],
        start: usize,
    ) -> Result<(Vec<TrendDirection>, Vec<f64>), IndicatorError> {
        let n = closes.len();
        if bands.len() != n {
            return Err(IndicatorError::invalid(
                "bands",
                format!("length mismatch: closes={n}, bands={}", bands.len()),
            ));
        }
        if start >= n {
            return Err(IndicatorError::insufficient(start + 1, n));
        }

        let mut direction = vec![TrendDirection::Undetermined; n];
        let mut values = vec![0.0; n];
        let mut prev = TrendDirection::Undetermined;

        for i in start..n {
            let d = self.step(prev, closes[i], bands[i]);
            direction[i] = d;
            values[i] = self.published_value(d, bands[i]);
            prev = d;
        }

        Ok((direction, values))
    }
}
