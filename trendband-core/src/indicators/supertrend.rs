//! Supertrend: ATR hysteresis bands around a center line, plus a trend
//! direction that flips only when price closes through the active band.
//!
//! Stages: true range → Wilder ATR and the center line run independently
//! (concurrently for long inputs), then the band ratchet and the trend
//! state machine run once, front to back.
//!
//! Lookback: `atr_period`. Bar `atr_period` is seeded from its raw bands
//! and its direction is `Up` iff close > upper, else `Down`.

use crate::config::SupertrendConfig;
use crate::domain::Series;
use crate::error::IndicatorError;
use crate::indicator::TrendIndicator;
use crate::indicators::atr::atr_with;
use crate::indicators::bands::HysteresisBandEngine;
use crate::indicators::center::CenterEstimator;
use crate::indicators::result::IndicatorResult;
use crate::indicators::trend::TrendStateMachine;
use crate::parallel::{par_join, WorkerPool};

#[derive(Debug, Clone)]
pub struct Supertrend {
    config: SupertrendConfig,
    parallel: WorkerPool,
    name: String,
}

impl Supertrend {
    pub fn new(config: SupertrendConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        Ok(Self {
            name: config.name(),
            config,
            parallel: WorkerPool::default(),
        })
    }

    /// Classic variant: bands around `(high + low) / 2`.
    pub fn hl2(atr_period: u32, multiplier: f64) -> Result<Self, IndicatorError> {
        Self::new(SupertrendConfig::hl2(atr_period, multiplier))
    }

    /// Bands around a damped running average of confirmed pivots.
    pub fn pivot(pivot_period: u32, multiplier: f64, atr_period: u32) -> Result<Self, IndicatorError> {
        Self::new(SupertrendConfig::pivot(pivot_period, multiplier, atr_period))
    }

    /// Run preprocessing on `pool`. Clones of one pool share its threads.
    pub fn with_parallel(mut self, parallel: WorkerPool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &SupertrendConfig {
        &self.config
    }
}

impl TrendIndicator for Supertrend {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.config.warmup()
    }

    fn compute(&self, series: &Series) -> Result<IndicatorResult, IndicatorError> {
        let bars = series.bars();
        let n = bars.len();
        let required = self.config.min_len();
        if n < required {
            return Err(IndicatorError::insufficient(required, n));
        }

        tracing::debug!(indicator = %self.name, bars = n, "computing");

        let estimator = CenterEstimator::new(self.config.center);
        let (atr, center) = par_join(
            n,
            &self.parallel,
            || atr_with(bars, self.config.atr_period, &self.parallel),
            || estimator.estimate(bars, &self.parallel),
        );
        let (atr, center) = (atr?, center?);

        let closes = series.closes();
        let start = self.config.warmup();
        let engine = HysteresisBandEngine::new(self.config.multiplier)?;
        let bands = engine.bands(&center, &atr, &closes, start)?;
        let (direction, values) = TrendStateMachine::new().resolve(&closes, &bands, start)?;

        let result = IndicatorResult::from_parts(values, direction, &bands);
        tracing::trace!(
            indicator = %self.name,
            direction = ?result.direction.last(),
            duration = result.trend_duration(),
            "done"
        );
        Ok(result)
    }
}

/// One-shot computation from a config.
pub fn compute_supertrend(
    series: &Series,
    config: &SupertrendConfig,
) -> Result<IndicatorResult, IndicatorError> {
    Supertrend::new(*config)?.compute(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TrendDirection;
    use crate::indicators::center::CenterPolicy;
    use crate::indicators::{make_bars, make_ohlc_bars};

    fn series(data: &[(f64, f64, f64, f64)]) -> Series {
        Series::new(make_ohlc_bars(data)).unwrap()
    }

    #[test]
    fn supertrend_uptrend_below_price() {
        // TR = 6 every bar, so ATR = 6 and raw bands are hl2 ± 12.
        let mut data = Vec::new();
        for i in 0..15 {
            let base = 100.0 + i as f64 * 2.0;
            data.push((base - 1.0, base + 3.0, base - 3.0, base + 1.0));
        }
        let s = series(&data);
        let result = Supertrend::hl2(3, 2.0).unwrap().compute(&s).unwrap();

        // Seeded below the first upper band (118), which then holds until
        // close 119 at bar 9 breaks it.
        for i in 3..9 {
            assert_eq!(result.direction[i], TrendDirection::Down, "bar {i}");
            assert_eq!(result.values[i], 118.0, "bar {i}");
        }
        for i in 9..15 {
            assert_eq!(result.direction[i], TrendDirection::Up, "bar {i}");
            assert!(
                result.values[i] < s.bars()[i].close,
                "supertrend ({}) should be below close ({}) at bar {i} in uptrend",
                result.values[i],
                s.bars()[i].close
            );
        }
    }

    #[test]
    fn supertrend_downtrend_above_price() {
        let mut data = Vec::new();
        for i in 0..15 {
            let base = 200.0 - i as f64 * 3.0;
            data.push((base + 1.0, base + 3.0, base - 3.0, base - 1.0));
        }
        let s = series(&data);
        let result = Supertrend::hl2(3, 2.0).unwrap().compute(&s).unwrap();

        for i in 3..15 {
            assert_eq!(result.direction[i], TrendDirection::Down);
            assert!(result.values[i] > s.bars()[i].close);
            assert_eq!(result.values[i], result.upper[i]);
        }
        // Upper only falls while price stays below it.
        for i in 4..15 {
            assert!(result.upper[i] <= result.upper[i - 1]);
        }
    }

    #[test]
    fn warmup_slots_hold_sentinels() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let s = Series::new(make_bars(&closes)).unwrap();
        let result = Supertrend::hl2(5, 3.0).unwrap().compute(&s).unwrap();
        assert_eq!(result.len(), 20);
        for i in 0..5 {
            assert_eq!(result.values[i], 0.0);
            assert_eq!(result.upper[i], 0.0);
            assert_eq!(result.lower[i], 0.0);
            assert_eq!(result.direction[i], TrendDirection::Undetermined);
        }
        assert!(result.direction[5..].iter().all(|d| *d != TrendDirection::Undetermined));
    }

    #[test]
    fn supertrend_lookback_and_name() {
        let st = Supertrend::hl2(14, 3.0).unwrap();
        assert_eq!(st.lookback(), 14);
        assert_eq!(st.name(), "supertrend_hl2_14_3");
        let st = Supertrend::pivot(2, 3.0, 10).unwrap();
        assert_eq!(st.config().center, CenterPolicy::Pivot { pivot_period: 2 });
    }

    #[test]
    fn supertrend_too_few_bars() {
        let s = series(&[(100.0, 105.0, 95.0, 102.0); 3]);
        assert_eq!(
            Supertrend::hl2(3, 2.0).unwrap().compute(&s),
            Err(IndicatorError::InsufficientData { required: 4, actual: 3 })
        );
        // Pivot window longer than the ATR warm-up raises the floor.
        let closes: Vec<f64> = (0..8).map(|i| 100.0 + i as f64).collect();
        let s = Series::new(make_bars(&closes)).unwrap();
        assert_eq!(
            Supertrend::pivot(10, 2.0, 3).unwrap().compute(&s),
            Err(IndicatorError::InsufficientData { required: 10, actual: 8 })
        );
    }

    #[test]
    fn invalid_parameters_fail_at_construction() {
        assert!(Supertrend::hl2(0, 3.0).is_err());
        assert!(Supertrend::hl2(10, 0.0).is_err());
        assert!(Supertrend::pivot(0, 3.0, 10).is_err());
    }

    #[test]
    fn pivot_variant_produces_full_length_output() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 8.0)
            .collect();
        let s = Series::new(make_bars(&closes)).unwrap();
        let result = Supertrend::pivot(3, 2.0, 5).unwrap().compute(&s).unwrap();
        assert_eq!(result.len(), 60);
        assert_eq!(result.direction.len(), 60);
        for i in 5..60 {
            let expected = match result.direction[i] {
                TrendDirection::Up => result.lower[i],
                TrendDirection::Down => result.upper[i],
                TrendDirection::Undetermined => panic!("undetermined after warm-up at {i}"),
            };
            assert_eq!(result.values[i], expected);
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let closes: Vec<f64> = (0..6000)
            .map(|i| 100.0 + (i as f64 * 0.05).sin() * 20.0 + i as f64 * 0.01)
            .collect();
        let s = Series::new(make_bars(&closes)).unwrap();
        let forced = WorkerPool::new(crate::parallel::ParallelConfig {
            min_parallel_len: 0,
            chunk_len: 256,
            num_threads: Some(2),
        })
        .unwrap();
        for config in [SupertrendConfig::hl2(10, 3.0), SupertrendConfig::pivot(4, 3.0, 10)] {
            let seq = Supertrend::new(config)
                .unwrap()
                .with_parallel(WorkerPool::sequential())
                .compute(&s)
                .unwrap();
            let par = Supertrend::new(config)
                .unwrap()
                .with_parallel(forced.clone())
                .compute(&s)
                .unwrap();
            assert_eq!(seq.digest(), par.digest());
        }
    }

    #[test]
    fn compute_supertrend_matches_indicator() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 7) as f64).collect();
        let s = Series::new(make_bars(&closes)).unwrap();
        let config = SupertrendConfig::default();
        let a = compute_supertrend(&s, &config).unwrap();
        let b = Supertrend::new(config).unwrap().compute(&s).unwrap();
        assert_eq!(a, b);
    }
}
