// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Histogram
// ─────────────────────────────────────────────────────────────────────
//! Fixed-break histogram with signed counts.
//!
//! Counts are signed so that a move can remove a value before the
//! matching add lands; callers keep them consistent, nothing here
//! checks for negatives.

use std::fmt;

use serde::{Deserialize, Serialize};

use sgen_types::{GenerateError, GenerateResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `num_bins + 1` increasing break points.
    pub breaks: Vec<f64>,
    pub counts: Vec<i64>,
}

/// `num_bins + 1` equally spaced breaks covering `[min, max]`.
pub fn generate_breaks(min: f64, max: f64, num_bins: usize) -> Vec<f64> {
    let width = (max - min) / num_bins as f64;
    let mut breaks: Vec<f64> = (0..=num_bins).map(|i| min + i as f64 * width).collect();
    if let Some(last) = breaks.last_mut() {
        *last = max;
    }
    breaks
}

impl Histogram {
    /// Empty histogram with equally spaced bins over `[min, max]`.
    pub fn from_range(min: f64, max: f64, num_bins: usize) -> GenerateResult<Self> {
        if num_bins == 0 {
            return Err(GenerateError::Config("histogram needs at least one bin".to_string()));
        }
        if !(min < max) || !min.is_finite() || !max.is_finite() {
            return Err(GenerateError::Config(format!(
                "histogram range must be finite with min < max, got [{min}, {max}]"
            )));
        }
        Self::with_breaks(generate_breaks(min, max, num_bins))
    }

    /// Empty histogram over explicit breaks.
    pub fn with_breaks(breaks: Vec<f64>) -> GenerateResult<Self> {
        if breaks.len() < 2 {
            return Err(GenerateError::Config(format!(
                "histogram needs at least 2 breaks, got {}",
                breaks.len()
            )));
        }
        if !breaks.windows(2).all(|w| w[0] < w[1]) {
            return Err(GenerateError::Config(
                "histogram breaks must be strictly increasing".to_string(),
            ));
        }
        let bins = breaks.len() - 1;
        Ok(Self {
            breaks,
            counts: vec![0; bins],
        })
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn min(&self) -> f64 {
        self.breaks[0]
    }

    pub fn max(&self) -> f64 {
        self.breaks[self.breaks.len() - 1]
    }

    /// Width of the first bin; all bins share it when built from a range.
    pub fn bin_width(&self) -> f64 {
        self.breaks[1] - self.breaks[0]
    }

    /// Bin holding `value`: `breaks[i] <= value < breaks[i+1]`, the last
    /// bin also holds its upper break.
    pub fn index_of(&self, value: f64) -> GenerateResult<usize> {
        if !(value >= self.min() && value <= self.max()) {
            return Err(GenerateError::Domain {
                value,
                min: self.min(),
                max: self.max(),
            });
        }
        let upper = self.breaks.partition_point(|&b| b <= value);
        Ok((upper - 1).min(self.num_bins() - 1))
    }

    pub fn increment(&mut self, bin: usize) {
        self.counts[bin] += 1;
    }

    pub fn decrement(&mut self, bin: usize) {
        self.counts[bin] -= 1;
    }

    pub fn add_value(&mut self, value: f64) -> GenerateResult<()> {
        let bin = self.index_of(value)?;
        self.increment(bin);
        Ok(())
    }

    pub fn remove_value(&mut self, value: f64) -> GenerateResult<()> {
        let bin = self.index_of(value)?;
        self.decrement(bin);
        Ok(())
    }

    /// Add every value. Fails on the first out-of-range value; values
    /// added before it stay counted.
    pub fn fill<I>(&mut self, values: I) -> GenerateResult<()>
    where
        I: IntoIterator<Item = f64>,
    {
        for v in values {
            self.add_value(v)?;
        }
        Ok(())
    }

    /// Remove `old` values and add `new` ones. Every lookup happens
    /// before any count changes, so an out-of-range value leaves the
    /// histogram untouched.
    pub fn replace_values(&mut self, old: &[f64], new: &[f64]) -> GenerateResult<()> {
        let old_bins = old
            .iter()
            .map(|&v| self.index_of(v))
            .collect::<GenerateResult<Vec<_>>>()?;
        let new_bins = new
            .iter()
            .map(|&v| self.index_of(v))
            .collect::<GenerateResult<Vec<_>>>()?;
        for bin in old_bins {
            self.decrement(bin);
        }
        for bin in new_bins {
            self.increment(bin);
        }
        Ok(())
    }

    pub fn reset_counts(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    pub fn total_count(&self) -> i64 {
        self.counts.iter().sum()
    }

    pub fn bin_centers(&self) -> Vec<f64> {
        self.breaks.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// `M[i] = counts[0] + ... + counts[i-1]`, so `M[0] = 0`.
    pub fn cumulative_exclusive(&self) -> Vec<i64> {
        let mut acc = 0;
        self.counts
            .iter()
            .map(|&c| {
                let m = acc;
                acc += c;
                m
            })
            .collect()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.num_bins() - 1;
        for (i, count) in self.counts.iter().enumerate() {
            let close = if i == last { ']' } else { ')' };
            writeln!(
                f,
                "[{:>18.9},{:>18.9}{} {:>18}",
                self.breaks[i],
                self.breaks[i + 1],
                close,
                count
            )?;
        }
        Ok(())
    }
}
