//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Shape: every output array has the input length; warm-up holds sentinels
//! 2. Ratchet monotonicity: bands only tighten while price stays inside them
//! 3. Flip rule: direction changes exactly when close crosses the active band
//! 4. Published value: always the active band for the current direction
//! 5. Determinism: same input and config give byte-identical results
//! 6. Monotone prices never produce an Up → Down flip

use proptest::prelude::*;
use trendband_core::domain::{Bar, Series, TrendDirection};
use trendband_core::indicators::bands::{ratchet, BandState};
use trendband_core::{
    compute_supertrend, ParallelConfig, Supertrend, SupertrendConfig, TrendIndicator, WorkerPool,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn series_from_returns(start: f64, returns: &[(f64, f64, f64)]) -> Series {
    let mut bars = Vec::with_capacity(returns.len());
    let mut close = start;
    for (i, &(ret, wick_up, wick_down)) in returns.iter().enumerate() {
        let open = close;
        close = open * (1.0 + ret);
        let high = open.max(close) + wick_up;
        let low = open.min(close) - wick_down;
        bars.push(Bar::new(i as i64 * 60_000, open, high, low, close, 1000.0));
    }
    Series::new(bars).unwrap()
}

fn arb_series() -> impl Strategy<Value = Series> {
    (
        50.0..500.0_f64,
        prop::collection::vec((-0.05..0.05_f64, 0.0..3.0_f64, 0.0..3.0_f64), 30..200),
    )
        .prop_map(|(start, returns)| series_from_returns(start, &returns))
}

fn arb_config() -> impl Strategy<Value = SupertrendConfig> {
    prop_oneof![
        (1u32..20, 0.5..5.0_f64).prop_map(|(p, m)| SupertrendConfig::hl2(p, m)),
        (1u32..8, 0.5..5.0_f64, 1u32..20).prop_map(|(pp, m, p)| SupertrendConfig::pivot(pp, m, p)),
    ]
}

fn active_band(direction: TrendDirection, band: BandState) -> f64 {
    match direction {
        TrendDirection::Up => band.lower,
        TrendDirection::Down => band.upper,
        TrendDirection::Undetermined => 0.0,
    }
}

// ── 1–4. Shape, ratchet, flips, published value ─────────────────────

proptest! {
    #[test]
    fn output_shape_and_warmup(series in arb_series(), config in arb_config()) {
        let result = compute_supertrend(&series, &config).unwrap();
        let n = series.len();
        prop_assert_eq!(result.values.len(), n);
        prop_assert_eq!(result.direction.len(), n);
        prop_assert_eq!(result.upper.len(), n);
        prop_assert_eq!(result.lower.len(), n);

        let start = config.atr_period as usize;
        for i in 0..start {
            prop_assert_eq!(result.direction[i], TrendDirection::Undetermined);
            prop_assert_eq!(result.values[i], 0.0);
        }
        for i in start..n {
            prop_assert_ne!(result.direction[i], TrendDirection::Undetermined);
        }
    }

    #[test]
    fn bands_only_tighten_while_price_inside(series in arb_series(), config in arb_config()) {
        let result = compute_supertrend(&series, &config).unwrap();
        let closes = series.closes();
        for i in (config.atr_period as usize + 1)..series.len() {
            if closes[i - 1] >= result.lower[i - 1] {
                prop_assert!(
                    result.lower[i] >= result.lower[i - 1],
                    "lower loosened at {}: {} -> {}", i, result.lower[i - 1], result.lower[i]
                );
            }
            if closes[i - 1] <= result.upper[i - 1] {
                prop_assert!(
                    result.upper[i] <= result.upper[i - 1],
                    "upper loosened at {}: {} -> {}", i, result.upper[i - 1], result.upper[i]
                );
            }
        }
    }

    #[test]
    fn flips_happen_exactly_on_band_cross(series in arb_series(), config in arb_config()) {
        let result = compute_supertrend(&series, &config).unwrap();
        let closes = series.closes();
        for i in (config.atr_period as usize + 1)..series.len() {
            let prev = result.direction[i - 1];
            let now = result.direction[i];
            match prev {
                TrendDirection::Up => {
                    prop_assert_eq!(now == TrendDirection::Down, closes[i] < result.lower[i]);
                }
                TrendDirection::Down => {
                    prop_assert_eq!(now == TrendDirection::Up, closes[i] > result.upper[i]);
                }
                TrendDirection::Undetermined => prop_assert!(false, "undetermined at {}", i - 1),
            }
        }
    }

    #[test]
    fn value_is_active_band(series in arb_series(), config in arb_config()) {
        let result = compute_supertrend(&series, &config).unwrap();
        for i in 0..series.len() {
            let band = BandState::new(result.upper[i], result.lower[i]);
            prop_assert_eq!(result.values[i], active_band(result.direction[i], band));
        }
    }

    /// The ratchet in isolation: a held side never moves.
    #[test]
    fn ratchet_never_loosens_inside_band(
        lower in 50.0..100.0_f64,
        width in 0.0..50.0_f64,
        raw_shift in -20.0..20.0_f64,
        close_frac in 0.0..1.0_f64,
    ) {
        let prev = BandState::new(lower + width, lower);
        let raw = BandState::new(prev.upper + raw_shift, prev.lower + raw_shift);
        let prev_close = lower + width * close_frac;
        let out = ratchet(prev, raw, prev_close);
        prop_assert!(out.lower >= prev.lower);
        prop_assert!(out.upper <= prev.upper);
    }
}

// ── 5. Determinism ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn repeated_runs_are_identical(series in arb_series(), config in arb_config()) {
        let a = compute_supertrend(&series, &config).unwrap();
        let b = compute_supertrend(&series, &config).unwrap();
        prop_assert_eq!(a.digest(), b.digest());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn parallel_matches_sequential(series in arb_series(), config in arb_config()) {
        let forced = WorkerPool::new(ParallelConfig { min_parallel_len: 0, chunk_len: 7, num_threads: None })
            .unwrap();
        let seq = Supertrend::new(config).unwrap()
            .with_parallel(WorkerPool::sequential())
            .compute(&series).unwrap();
        let par = Supertrend::new(config).unwrap()
            .with_parallel(forced)
            .compute(&series).unwrap();
        prop_assert_eq!(seq.digest(), par.digest());
    }
}

// ── 6. Monotone prices ───────────────────────────────────────────────

proptest! {
    /// With non-decreasing closes and a symmetric range around each close,
    /// an uptrend is never abandoned.
    #[test]
    fn rising_prices_never_flip_down(
        start in 50.0..200.0_f64,
        steps in prop::collection::vec(0.0..2.0_f64, 30..150),
        half_range in 0.1..3.0_f64,
        atr_period in 1u32..15,
        multiplier in 0.5..4.0_f64,
    ) {
        let mut close = start;
        let bars: Vec<Bar> = steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let open = close;
                close += step;
                Bar::new(i as i64, open, close + half_range, close - half_range, close, 1.0)
            })
            .collect();
        let series = Series::new(bars).unwrap();
        let result = compute_supertrend(&series, &SupertrendConfig::hl2(atr_period, multiplier)).unwrap();
        for w in result.direction.windows(2) {
            prop_assert!(
                !(w[0] == TrendDirection::Up && w[1] == TrendDirection::Down),
                "up -> down flip on rising prices"
            );
        }
    }
}
