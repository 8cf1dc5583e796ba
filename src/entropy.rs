// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Histogram-based Shannon entropy of a rolling window.

use crate::config::EntropyConfig;

/// Shannon entropy estimator over equal-width histogram bins.
#[derive(Debug, Clone)]
pub struct EntropyEstimator {
    bins: usize,
    min_samples: usize,
}

impl EntropyEstimator {
    pub fn new(config: &EntropyConfig) -> Self {
        Self {
            bins: config.bins.max(1),
            min_samples: config.min_samples,
        }
    }

    /// Entropy in bits of `values`. Zero below the sample threshold.
    pub fn entropy(&self, values: &[f64]) -> f64 {
        if values.len() < self.min_samples || values.is_empty() {
            return 0.0;
        }

        let counts = self.histogram(values);
        let total: usize = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }

        // A single occupied bin carries no information.
        if counts.iter().filter(|&&c| c > 0).count() < 2 {
            return 0.0;
        }

        let total = total as f64;
        counts
            .iter()
            .filter(|&&c| c > 0)
            .fold(0.0, |acc, &c| {
                let p = c as f64 / total;
                acc - p * p.log2()
            })
    }

    /// Bin counts over `[min, max]`, last edge inclusive.
    ///
    /// Equal bin widths make the density histogram proportional to counts,
    /// so counts are normalized directly.
    fn histogram(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0usize; self.bins];

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        // Halved so that finite extremes of opposite sign cannot overflow.
        let half_range = max / 2.0 - min / 2.0;
        if half_range <= 0.0 || !half_range.is_finite() {
            counts[self.bins / 2] = values.len();
            return counts;
        }

        let bins = self.bins as f64;
        for &v in values {
            let position = (v / 2.0 - min / 2.0) / half_range;
            let idx = (position * bins) as usize;
            counts[idx.min(self.bins - 1)] += 1;
        }
        counts
    }
}

impl Default for EntropyEstimator {
    fn default() -> Self {
        Self::new(&EntropyConfig::default())
    }
}
