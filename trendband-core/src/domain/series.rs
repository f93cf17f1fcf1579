//! Ordered, validated, non-empty sequence of bars.
//!
//! Engines borrow a `Series` read-only and return freshly allocated result
//! buffers. There is no API that mutates or reslices a caller's series in
//! place; `tail` hands back a new owned series.

use crate::domain::Bar;
use crate::error::IndicatorError;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: Vec<Bar>,
}

impl Series {
    /// Build a series, checking the invariants every engine relies on:
    /// at least one bar, finite OHLCV, timestamps non-decreasing.
    pub fn new(bars: Vec<Bar>) -> Result<Self, IndicatorError> {
        if bars.is_empty() {
            return Err(IndicatorError::insufficient(1, 0));
        }

        if let Some(i) = bars.iter().position(|b| b.is_void()) {
            return Err(IndicatorError::invalid(
                "bars",
                format!("bar {i} has a non-finite OHLCV field"),
            ));
        }

        if let Some(i) = bars
            .windows(2)
            .position(|w| w[1].timestamp < w[0].timestamp)
        {
            return Err(IndicatorError::invalid(
                "bars",
                format!(
                    "timestamps must be non-decreasing: bar {} ({}) precedes bar {} ({})",
                    i,
                    bars[i].timestamp,
                    i + 1,
                    bars[i + 1].timestamp
                ),
            ));
        }

        Ok(Self { bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for slice-like ergonomics.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn last(&self) -> &Bar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }

    /// New series holding the last `n` bars.
    pub fn tail(&self, n: usize) -> Result<Series, IndicatorError> {
        if n == 0 {
            return Err(IndicatorError::invalid("n", "must be > 0"));
        }
        if n > self.bars.len() {
            return Err(IndicatorError::insufficient(n, self.bars.len()));
        }
        Ok(Series {
            bars: self.bars[self.bars.len() - n..].to_vec(),
        })
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

impl AsRef<[Bar]> for Series {
    fn as_ref(&self) -> &[Bar] {
        &self.bars
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.bars.iter()
    }
}
