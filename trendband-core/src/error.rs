//! Engine error taxonomy.
//!
//! Every computation entry point validates its parameters and input length
//! up front and returns one of these. No partial output is ever returned
//! alongside an error.

use thiserror::Error;

/// Errors from the smoothing, ATR, band and trend computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// Input shorter than the minimum lookback of the chosen configuration.
    #[error("insufficient data: need at least {required} values, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Non-positive period or multiplier, non-finite price, or similar.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl IndicatorError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn insufficient(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }
}

/// Reject a zero period.
pub(crate) fn require_period(name: &'static str, period: u32) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::invalid(name, "must be > 0"));
    }
    Ok(())
}

/// Reject a multiplier that is not a positive finite number.
pub(crate) fn require_multiplier(multiplier: f64) -> Result<(), IndicatorError> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(IndicatorError::invalid(
            "multiplier",
            format!("must be a positive finite number, got {multiplier}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_period_is_rejected() {
        let err = require_period("atr_period", 0).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::InvalidParameter { name: "atr_period", .. }
        ));
        assert!(require_period("atr_period", 1).is_ok());
    }

    #[test]
    fn multiplier_must_be_positive_and_finite() {
        assert!(require_multiplier(3.0).is_ok());
        assert!(require_multiplier(0.0).is_err());
        assert!(require_multiplier(-1.0).is_err());
        assert!(require_multiplier(f64::NAN).is_err());
        assert!(require_multiplier(f64::INFINITY).is_err());
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = IndicatorError::insufficient(11, 5);
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 11 values, got 5"
        );
    }
}
