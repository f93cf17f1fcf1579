//! TrendBand Core: SuperTrend-family trend following over OHLCV bars.
//!
//! This crate contains:
//! - Domain types (bars, series, trend direction)
//! - Smoothing (EMA and Wilder), true range, ATR and volatility readings
//! - Center estimation (HL2 or damped pivot midline)
//! - Hysteresis band ratchet and trend state machine
//! - Result analytics and deterministic digests
//! - Ingestion boundary (schema detection, canonicalization, CSV)
//! - Parallel preprocessing on rayon

pub mod config;
pub mod convenience;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicator;
pub mod indicators;
pub mod parallel;

pub use config::{ConfigError, EngineConfig, SupertrendConfig};
pub use domain::{Bar, Series, TrendDirection};
pub use error::IndicatorError;
pub use indicator::TrendIndicator;
pub use indicators::{compute_supertrend, CenterPolicy, IndicatorResult, Supertrend};
pub use parallel::{ParallelConfig, WorkerPool};
