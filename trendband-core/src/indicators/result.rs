//! Indicator output: four parallel arrays plus read-only analytics.

use serde::{Deserialize, Serialize};

use crate::domain::TrendDirection;
use crate::indicators::bands::BandState;

/// Relative bandwidth change above which a breakout is flagged by default.
pub const DEFAULT_BREAKOUT_THRESHOLD: f64 = 0.1;

/// Output of one computation. All vectors have the input series' length;
/// warm-up slots hold `0.0` / `Undetermined`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub values: Vec<f64>,
    pub direction: Vec<TrendDirection>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Snapshot of the last bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestReading {
    pub value: f64,
    pub direction: TrendDirection,
    pub upper: f64,
    pub lower: f64,
}

impl IndicatorResult {
    pub(crate) fn from_parts(
        values: Vec<f64>,
        direction: Vec<TrendDirection>,
        bands: &[BandState],
    ) -> Self {
        Self {
            values,
            direction,
            upper: bands.iter().map(|b| b.upper).collect(),
            lower: bands.iter().map(|b| b.lower).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn band(&self, index: usize) -> Option<BandState> {
        Some(BandState::new(*self.upper.get(index)?, *self.lower.get(index)?))
    }

    pub fn latest(&self) -> Option<LatestReading> {
        let i = self.len().checked_sub(1)?;
        Some(LatestReading {
            value: self.values[i],
            direction: self.direction[i],
            upper: self.upper[i],
            lower: self.lower[i],
        })
    }

    fn last_two_directions(&self) -> Option<(TrendDirection, TrendDirection)> {
        match self.direction.as_slice() {
            [.., prev, last] => Some((*prev, *last)),
            _ => None,
        }
    }

    fn bandwidth_at(&self, index: usize) -> f64 {
        self.upper[index] - self.lower[index]
    }

    fn last_two_bandwidths(&self) -> Option<(f64, f64)> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        Some((self.bandwidth_at(n - 2), self.bandwidth_at(n - 1)))
    }

    pub fn is_trend_change(&self) -> bool {
        self.last_two_directions().is_some_and(|(prev, last)| prev != last)
    }

    /// Last bar turned up from anything else.
    pub fn is_bullish_cross(&self) -> bool {
        self.last_two_directions()
            .is_some_and(|(prev, last)| prev != TrendDirection::Up && last == TrendDirection::Up)
    }

    /// Last bar turned down from anything else.
    pub fn is_bearish_cross(&self) -> bool {
        self.last_two_directions().is_some_and(|(prev, last)| {
            prev != TrendDirection::Down && last == TrendDirection::Down
        })
    }

    /// Number of trailing bars sharing the latest direction. Zero with
    /// fewer than two bars.
    pub fn trend_duration(&self) -> usize {
        match self.direction.as_slice() {
            [.., _, last] => self.direction.iter().rev().take_while(|&d| d == last).count(),
            _ => 0,
        }
    }

    /// `upper - lower` at the last bar.
    pub fn bandwidth(&self) -> Option<f64> {
        let i = self.len().checked_sub(1)?;
        Some(self.bandwidth_at(i))
    }

    /// Bandwidth signed by the trend: positive up, negative down, 0 undetermined.
    pub fn trend_strength(&self) -> Option<f64> {
        let width = self.bandwidth()?;
        Some(match self.direction.last()? {
            TrendDirection::Up => width,
            TrendDirection::Down => -width,
            TrendDirection::Undetermined => 0.0,
        })
    }

    pub fn is_trend_strengthening(&self) -> bool {
        self.last_two_bandwidths()
            .is_some_and(|(prev, last)| last > prev)
    }

    pub fn is_trend_weakening(&self) -> bool {
        self.last_two_bandwidths()
            .is_some_and(|(prev, last)| last < prev)
    }

    /// Relative bandwidth change over the last bar exceeds `threshold`
    /// (default [`DEFAULT_BREAKOUT_THRESHOLD`]).
    pub fn is_breakout_possible(&self, threshold: Option<f64>) -> bool {
        let threshold = threshold.unwrap_or(DEFAULT_BREAKOUT_THRESHOLD);
        match self.last_two_bandwidths() {
            Some((prev, last)) if prev != 0.0 => ((last - prev) / prev).abs() > threshold,
            _ => false,
        }
    }

    /// `trend_duration * trend_strength`.
    pub fn trend_quality(&self) -> Option<f64> {
        Some(self.trend_duration() as f64 * self.trend_strength()?)
    }

    /// BLAKE3 digest over every output array. Two results with the same
    /// digest are byte-identical.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.len() as u64).to_le_bytes());
        for v in &self.values {
            hasher.update(&v.to_le_bytes());
        }
        for d in &self.direction {
            hasher.update(&d.code().to_le_bytes());
        }
        for v in &self.upper {
            hasher.update(&v.to_le_bytes());
        }
        for v in &self.lower {
            hasher.update(&v.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TrendDirection::{Down, Undetermined, Up};

    fn result(direction: Vec<TrendDirection>, upper: Vec<f64>, lower: Vec<f64>) -> IndicatorResult {
        let values = direction
            .iter()
            .zip(upper.iter().zip(lower.iter()))
            .map(|(d, (u, l))| match d {
                Up => *l,
                Down => *u,
                Undetermined => 0.0,
            })
            .collect();
        IndicatorResult {
            values,
            direction,
            upper,
            lower,
        }
    }

    #[test]
    fn latest_reading() {
        let r = result(vec![Undetermined, Up], vec![0.0, 110.0], vec![0.0, 90.0]);
        let latest = r.latest().unwrap();
        assert_eq!(latest.value, 90.0);
        assert_eq!(latest.direction, Up);
        assert_eq!(r.band(1), Some(BandState::new(110.0, 90.0)));
        assert_eq!(r.band(2), None);
    }

    #[test]
    fn empty_result_has_no_readings() {
        let r = result(vec![], vec![], vec![]);
        assert!(r.latest().is_none());
        assert!(r.bandwidth().is_none());
        assert_eq!(r.trend_duration(), 0);
        assert!(!r.is_trend_change());
        assert!(!r.is_breakout_possible(None));
    }

    #[test]
    fn single_bar_has_no_duration() {
        let r = result(vec![Up], vec![110.0], vec![90.0]);
        assert_eq!(r.trend_duration(), 0);
        assert_eq!(r.trend_quality(), Some(0.0));
        let r = result(vec![Down, Up], vec![110.0, 110.0], vec![90.0, 90.0]);
        assert_eq!(r.trend_duration(), 1);
    }

    #[test]
    fn crosses() {
        let bull = result(vec![Down, Up], vec![110.0, 110.0], vec![90.0, 90.0]);
        assert!(bull.is_trend_change());
        assert!(bull.is_bullish_cross());
        assert!(!bull.is_bearish_cross());

        let bear = result(vec![Up, Down], vec![110.0, 110.0], vec![90.0, 90.0]);
        assert!(bear.is_bearish_cross());
        assert!(!bear.is_bullish_cross());

        let from_warmup = result(vec![Undetermined, Up], vec![0.0, 110.0], vec![0.0, 90.0]);
        assert!(from_warmup.is_bullish_cross());

        let steady = result(vec![Up, Up], vec![110.0, 110.0], vec![90.0, 91.0]);
        assert!(!steady.is_trend_change());
    }

    #[test]
    fn duration_counts_trailing_run() {
        let r = result(
            vec![Undetermined, Down, Up, Up, Up],
            vec![0.0, 1.0, 1.0, 1.0, 1.0],
            vec![0.0; 5],
        );
        assert_eq!(r.trend_duration(), 3);
    }

    #[test]
    fn strength_is_signed_by_direction() {
        let up = result(vec![Up], vec![110.0], vec![90.0]);
        assert_eq!(up.bandwidth(), Some(20.0));
        assert_eq!(up.trend_strength(), Some(20.0));
        let down = result(vec![Down], vec![110.0], vec![90.0]);
        assert_eq!(down.trend_strength(), Some(-20.0));
        let und = result(vec![Undetermined], vec![0.0], vec![0.0]);
        assert_eq!(und.trend_strength(), Some(0.0));
    }

    #[test]
    fn strengthening_and_weakening() {
        let widening = result(vec![Up, Up], vec![110.0, 112.0], vec![90.0, 90.0]);
        assert!(widening.is_trend_strengthening());
        assert!(!widening.is_trend_weakening());
        let narrowing = result(vec![Up, Up], vec![110.0, 108.0], vec![90.0, 90.0]);
        assert!(narrowing.is_trend_weakening());
    }

    #[test]
    fn breakout_uses_relative_bandwidth_change() {
        // 20 -> 23 is a 15% change.
        let r = result(vec![Up, Up], vec![110.0, 113.0], vec![90.0, 90.0]);
        assert!(r.is_breakout_possible(None));
        assert!(!r.is_breakout_possible(Some(0.2)));
        // Zero previous width never flags.
        let r = result(vec![Undetermined, Up], vec![0.0, 110.0], vec![0.0, 90.0]);
        assert!(!r.is_breakout_possible(None));
    }

    #[test]
    fn quality_is_duration_times_strength() {
        let r = result(vec![Up, Up, Up], vec![110.0; 3], vec![100.0; 3]);
        assert_eq!(r.trend_quality(), Some(30.0));
    }

    #[test]
    fn digest_is_stable_and_sensitive() {
        let a = result(vec![Up, Up], vec![110.0, 111.0], vec![90.0, 91.0]);
        let b = a.clone();
        assert_eq!(a.digest(), b.digest());
        let mut c = a.clone();
        c.lower[1] = 91.000_000_1;
        assert_ne!(a.digest(), c.digest());
        let mut d = a.clone();
        d.direction[0] = Down;
        assert_ne!(a.digest(), d.digest());
    }
}
