//! Causal running averages: EMA and Wilder.
//!
//! EMA: seed at `period - 1` = mean of the first `period` inputs, then
//! `out[i] = input[i] * k + out[i-1] * (1 - k)` with `k = 2 / (period + 1)`.
//!
//! Wilder: input index 0 is skipped (true range has no value there). Seed at
//! `period` = mean of `input[1..=period]`, then
//! `out[i] = (out[i-1] * (period - 1) + input[i]) / period`.
//!
//! Slots before the seed hold the `0.0` sentinel.

use serde::{Deserialize, Serialize};

use crate::error::{require_period, IndicatorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SmoothingMode {
    Ema,
    Wilder,
}

/// Streaming form of the smoother. One instance per input series.
#[derive(Debug, Clone, PartialEq)]
pub struct SmootherState {
    pub period: u32,
    pub current: f64,
    pub initialized: bool,
    mode: SmoothingMode,
    seed_sum: f64,
    seed_count: u32,
}

impl SmootherState {
    pub fn new(period: u32, mode: SmoothingMode) -> Result<Self, IndicatorError> {
        require_period("period", period)?;
        Ok(Self {
            period,
            current: 0.0,
            initialized: false,
            mode,
            seed_sum: 0.0,
            seed_count: 0,
        })
    }

    /// Feed one sample. Returns the smoothed value once the seed window
    /// is full, `None` while still accumulating it.
    pub fn push(&mut self, sample: f64) -> Option<f64> {
        if !self.initialized {
            self.seed_sum += sample;
            self.seed_count += 1;
            if self.seed_count == self.period {
                self.current = self.seed_sum / f64::from(self.period);
                self.initialized = true;
                return Some(self.current);
            }
            return None;
        }

        let p = f64::from(self.period);
        self.current = match self.mode {
            SmoothingMode::Ema => {
                let k = 2.0 / (p + 1.0);
                sample * k + self.current * (1.0 - k)
            }
            SmoothingMode::Wilder => (self.current * (p - 1.0) + sample) / p,
        };
        Some(self.current)
    }
}

/// Smooth a whole series. Output has the same length as `input`.
pub fn smooth(input: &[f64], period: u32, mode: SmoothingMode) -> Result<Vec<f64>, IndicatorError> {
    require_period("period", period)?;
    let p = period as usize;

    // Wilder skips index 0, so it needs one extra sample.
    let (start, required) = match mode {
        SmoothingMode::Ema => (0, p),
        SmoothingMode::Wilder => (1, p + 1),
    };
    if input.len() < required {
        return Err(IndicatorError::insufficient(required, input.len()));
    }

    if let Some(i) = input[start..].iter().position(|v| !v.is_finite()) {
        return Err(IndicatorError::invalid(
            "input",
            format!("non-finite value at index {}", i + start),
        ));
    }

    let mut out = vec![0.0; input.len()];
    let mut state = SmootherState::new(period, mode)?;
    for (i, &x) in input.iter().enumerate().skip(start) {
        if let Some(v) = state.push(x) {
            out[i] = v;
        }
    }

    Ok(out)
}
