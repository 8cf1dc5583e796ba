// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Pairwise Pearson correlation across source windows.
//!
//! Windows are aligned by position: the last `n` values of each source are
//! paired up, where `n` is the shorter window length. This assumes sources
//! are sampled in lockstep. Sources with independent cadences will have
//! mismatched time periods correlated against each other.

use crate::config::CorrelationConfig;
use serde::{Deserialize, Serialize};

/// One upper-triangle entry of the correlation matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub source_a: String,
    pub source_b: String,
    /// Pearson coefficient in [-1, 1]; 0 when undefined.
    pub coefficient: f64,
    /// Number of aligned samples the coefficient was computed over.
    pub overlap: usize,
    /// Whether the overlap met the minimum sample requirement.
    pub valid: bool,
}

/// Computes Pearson coefficients between source windows.
#[derive(Debug, Clone)]
pub struct CorrelationTracker {
    min_samples: usize,
}

impl CorrelationTracker {
    pub fn new(config: &CorrelationConfig) -> Self {
        Self {
            min_samples: config.min_samples,
        }
    }

    /// Pearson correlation of the aligned suffixes of `a` and `b`.
    pub fn correlation(&self, a: &[f64], b: &[f64]) -> f64 {
        let n = a.len().min(b.len());
        if n < self.min_samples {
            return 0.0;
        }
        pearson(&a[a.len() - n..], &b[b.len() - n..])
    }

    /// Upper-triangle matrix over `windows`, which must be sorted by id.
    pub fn matrix<'a>(&self, windows: &[(&'a str, &'a [f64])]) -> Vec<CorrelationPair> {
        let mut pairs = Vec::with_capacity(windows.len() * windows.len().saturating_sub(1) / 2);

        for (i, (id_a, a)) in windows.iter().enumerate() {
            for (id_b, b) in &windows[i + 1..] {
                let overlap = a.len().min(b.len());
                pairs.push(CorrelationPair {
                    source_a: id_a.to_string(),
                    source_b: id_b.to_string(),
                    coefficient: self.correlation(a, b),
                    overlap,
                    valid: overlap >= self.min_samples,
                });
            }
        }

        pairs
    }

    /// Mean |r| over valid pairs, 0 when none.
    pub fn mean_abs(pairs: &[CorrelationPair]) -> f64 {
        let (sum, count) = pairs
            .iter()
            .filter(|p| p.valid)
            .fold((0.0, 0usize), |(s, c), p| (s + p.coefficient.abs(), c + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

impl Default for CorrelationTracker {
    fn default() -> Self {
        Self::new(&CorrelationConfig::default())
    }
}

/// Pearson coefficient of two equal-length series.
///
/// Zero-variance inputs and non-finite results yield 0.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }

    let nf = n as f64;
    let mean_x = x[..n].iter().sum::<f64>() / nf;
    let mean_y = y[..n].iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x[..n].iter().zip(&y[..n]) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
