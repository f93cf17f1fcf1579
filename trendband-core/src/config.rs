//! Serializable engine configuration.
//!
//! Loaded from TOML by the CLI and validated at entry:
//!
//! ```toml
//! [supertrend]
//! atr_period = 10
//! multiplier = 3.0
//!
//! [supertrend.center]
//! type = "PIVOT"
//! pivot_period = 5
//!
//! [parallel]
//! min_parallel_len = 4096
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::error::{require_multiplier, require_period, IndicatorError};
use crate::indicators::center::CenterPolicy;
use crate::parallel::ParallelConfig;

/// Errors from loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] IndicatorError),

    #[error("failed to encode config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parameters of one SuperTrend computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupertrendConfig {
    pub atr_period: u32,
    pub multiplier: f64,
    pub center: CenterPolicy,
}

impl Default for SupertrendConfig {
    fn default() -> Self {
        Self {
            atr_period: 10,
            multiplier: 3.0,
            center: CenterPolicy::Hl2,
        }
    }
}

impl SupertrendConfig {
    pub fn hl2(atr_period: u32, multiplier: f64) -> Self {
        Self {
            atr_period,
            multiplier,
            center: CenterPolicy::Hl2,
        }
    }

    pub fn pivot(pivot_period: u32, multiplier: f64, atr_period: u32) -> Self {
        Self {
            atr_period,
            multiplier,
            center: CenterPolicy::Pivot { pivot_period },
        }
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        require_period("atr_period", self.atr_period)?;
        require_multiplier(self.multiplier)?;
        if let CenterPolicy::Pivot { pivot_period } = self.center {
            require_period("pivot_period", pivot_period)?;
        }
        Ok(())
    }

    /// Index of the first defined output (first ATR value).
    pub fn warmup(&self) -> usize {
        self.atr_period as usize
    }

    /// Shortest series this configuration accepts.
    pub fn min_len(&self) -> usize {
        let atr_min = self.atr_period as usize + 1;
        match self.center {
            CenterPolicy::Hl2 => atr_min,
            CenterPolicy::Pivot { pivot_period } => atr_min.max(pivot_period as usize),
        }
    }

    /// Human-readable name, e.g. `supertrend_hl2_10_3`.
    pub fn name(&self) -> String {
        match self.center {
            CenterPolicy::Hl2 => format!("supertrend_hl2_{}_{}", self.atr_period, self.multiplier),
            CenterPolicy::Pivot { pivot_period } => format!(
                "supertrend_pivot_{}_{}_{}",
                pivot_period, self.multiplier, self.atr_period
            ),
        }
    }

    /// BLAKE3 over the canonical JSON form of this configuration.
    ///
    /// Two configs with the same id produce byte-identical output on the
    /// same series.
    pub fn config_id(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}

/// Top-level config file: the indicator plus parallelism tuning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub supertrend: SupertrendConfig,
    pub parallel: ParallelConfig,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        self.supertrend.validate()?;
        self.parallel.validate()
    }
}
