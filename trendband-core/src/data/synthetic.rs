//! Deterministic synthetic bars.
//!
//! Geometric random walk with a seeded `StdRng`: the same `(n, seed,
//! start_price)` always yields the same series. Bars are one minute apart
//! starting at 2024-01-01T00:00:00Z.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Bar, Series};
use crate::error::IndicatorError;

const START_MS: i64 = 1_704_067_200_000;
const STEP_MS: i64 = 60_000;

pub fn generate_series(n: usize, seed: u64, start_price: f64) -> Result<Series, IndicatorError> {
    if n == 0 {
        return Err(IndicatorError::insufficient(1, 0));
    }
    if !start_price.is_finite() || start_price <= 0.0 {
        return Err(IndicatorError::invalid(
            "start_price",
            format!("must be a positive finite number, got {start_price}"),
        ));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(n);
    let mut close = start_price;

    for i in 0..n {
        let open = close;
        let ret: f64 = rng.gen_range(-0.02..0.02);
        close = open * (1.0 + ret);
        let wick_up: f64 = rng.gen_range(0.0..0.01);
        let wick_down: f64 = rng.gen_range(0.0..0.01);
        let high = open.max(close) * (1.0 + wick_up);
        let low = open.min(close) * (1.0 - wick_down);
        let volume: f64 = rng.gen_range(1_000.0..10_000.0);
        bars.push(Bar::new(START_MS + i as i64 * STEP_MS, open, high, low, close, volume));
    }

    Series::new(bars)
}
