//! Per-bar trend label.

use serde::{Deserialize, Serialize};

/// Trend direction published for every bar.
///
/// `Undetermined` only appears in the warm-up prefix, before the first
/// defined ATR value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    #[default]
    Undetermined,
    Up,
    Down,
}

impl TrendDirection {
    /// Signed code: `1` up, `-1` down, `0` undetermined.
    pub fn code(self) -> i8 {
        match self {
            TrendDirection::Undetermined => 0,
            TrendDirection::Up => 1,
            TrendDirection::Down => -1,
        }
    }

    pub fn is_up(self) -> bool {
        self == TrendDirection::Up
    }

    pub fn is_down(self) -> bool {
        self == TrendDirection::Down
    }
}
