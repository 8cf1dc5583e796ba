// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-source anomaly scoring against a frozen baseline.
//!
//! Each source learns its baseline (mean, std) once, on the reading that
//! brings it to `min_samples` finite readings, from the readings before that
//! one. The baseline is never re-estimated, so a drifting signal keeps
//! scoring against the same reference.

use crate::config::AnomalyConfig;
use crate::window::RollingBuffer;
use serde::{Deserialize, Serialize};

/// Frozen per-source reference statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl Baseline {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// Population mean and standard deviation of `values`.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std: variance.max(0.0).sqrt(),
        })
    }

    /// Score `value` against this baseline.
    pub fn evaluate(&self, value: f64, config: &AnomalyConfig) -> AnomalyVerdict {
        if self.std.is_nan() || self.std < config.min_std || !value.is_finite() {
            return AnomalyVerdict::NORMAL;
        }
        let z = (value - self.mean).abs() / self.std;
        AnomalyVerdict {
            z_score: z,
            is_anomaly: z >= config.threshold_sigma,
            score: (z / (2.0 * config.threshold_sigma)).min(1.0),
        }
    }
}

/// Result of scoring one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub z_score: f64,
    pub is_anomaly: bool,
    /// Continuous score in [0, 1], saturating at twice the flag threshold.
    pub score: f64,
}

impl AnomalyVerdict {
    pub const NORMAL: Self = Self {
        z_score: 0.0,
        is_anomaly: false,
        score: 0.0,
    };
}

/// Anomaly state for one source.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    /// Finite readings observed so far.
    observed: u64,
    baseline: Option<Baseline>,
    latest: Option<f64>,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a finite reading.
    ///
    /// `window` is the source's rolling window after the reading was pushed;
    /// its newest element is `value`. Returns true if the baseline was
    /// learned on this call.
    pub fn observe(&mut self, value: f64, window: &RollingBuffer, config: &AnomalyConfig) -> bool {
        self.observed += 1;
        self.latest = Some(value);

        if self.baseline.is_some() || self.observed < config.min_samples as u64 {
            return false;
        }

        let recent = window.tail(config.min_samples);
        self.baseline = Baseline::from_values(&recent[..recent.len().saturating_sub(1)]);
        self.baseline.is_some()
    }

    /// Verdict for the most recent reading.
    pub fn current(&self, config: &AnomalyConfig) -> AnomalyVerdict {
        match (self.baseline, self.latest) {
            (Some(baseline), Some(latest)) => baseline.evaluate(latest, config),
            _ => AnomalyVerdict::NORMAL,
        }
    }

    pub fn baseline(&self) -> Option<Baseline> {
        self.baseline
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }

    pub fn latest(&self) -> Option<f64> {
        self.latest
    }
}
