// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Critical threshold calibration.
//!
//! The calibrator counts snapshots and keeps the complexity history. On the
//! snapshot where the count first reaches `warmup_snapshots`, the critical
//! threshold (a high percentile of the history) and the minimum are fixed and
//! never recomputed. Later complexity values above the threshold do not move
//! it; the calibrated range is a fixed reference frame.

use crate::complexity::ComplexityIndex;
use crate::config::CalibrationConfig;
use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};

/// Frozen calibration thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Critical complexity (percentile of the warmup history).
    pub c_critical: f64,
    /// Minimum complexity observed during warmup.
    pub c_min: f64,
}

/// Serializable calibration state, used for export/import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub sample_count: u64,
    pub warmup_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thresholds: Option<Thresholds>,
    /// Complexity history, oldest first.
    pub history: Vec<f64>,
}

/// Warmup tracker and threshold calibrator.
#[derive(Debug, Clone)]
pub struct CriticalityCalibrator {
    config: CalibrationConfig,
    index: ComplexityIndex,
    sample_count: u64,
    thresholds: Option<Thresholds>,
}

impl CriticalityCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            index: ComplexityIndex::new(config.history_capacity),
            config,
            sample_count: 0,
            thresholds: None,
        }
    }

    /// Record one snapshot's complexity. Returns true if calibration
    /// completed on this call.
    pub fn observe(&mut self, complexity: f64) -> bool {
        self.sample_count += 1;
        self.index.record(complexity);

        if self.thresholds.is_some() || self.sample_count < self.config.warmup_snapshots {
            return false;
        }

        let history: Vec<f64> = self.index.history().collect();
        let c_critical = percentile(&history, self.config.critical_percentile).unwrap_or(0.0);
        let c_min = history.iter().copied().fold(f64::INFINITY, f64::min);
        let c_min = if c_min.is_finite() { c_min } else { 0.0 };

        self.thresholds = Some(Thresholds { c_critical, c_min });
        true
    }

    pub fn is_complete(&self) -> bool {
        self.thresholds.is_some()
    }

    pub fn thresholds(&self) -> Option<Thresholds> {
        self.thresholds
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn history_len(&self) -> usize {
        self.index.len()
    }

    /// Warmup progress in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.config.warmup_snapshots == 0 || self.is_complete() {
            return 1.0;
        }
        (self.sample_count as f64 / self.config.warmup_snapshots as f64).min(1.0)
    }

    pub fn reset(&mut self) {
        self.index.clear();
        self.sample_count = 0;
        self.thresholds = None;
    }

    pub fn export(&self) -> CalibrationRecord {
        CalibrationRecord {
            sample_count: self.sample_count,
            warmup_complete: self.is_complete(),
            thresholds: self.thresholds,
            history: self.index.history().collect(),
        }
    }

    /// Replace the state with `record`. Refused once calibrated.
    pub fn import(&mut self, record: CalibrationRecord) -> Result<()> {
        if self.is_complete() {
            return Err(MonitorError::CalibrationLocked);
        }
        if record.history.len() > self.index.capacity() {
            return Err(MonitorError::InvalidCalibration(format!(
                "history has {} points, capacity is {}",
                record.history.len(),
                self.index.capacity()
            )));
        }
        if record.history.iter().any(|v| !v.is_finite()) {
            return Err(MonitorError::InvalidCalibration(
                "history contains non-finite values".to_string(),
            ));
        }
        match (record.warmup_complete, record.thresholds) {
            (true, None) => {
                return Err(MonitorError::InvalidCalibration(
                    "warmup complete without thresholds".to_string(),
                ))
            }
            (false, Some(_)) => {
                return Err(MonitorError::InvalidCalibration(
                    "thresholds present before warmup completed".to_string(),
                ))
            }
            (_, Some(t)) if !(t.c_critical.is_finite() && t.c_min.is_finite()) => {
                return Err(MonitorError::InvalidCalibration(
                    "thresholds must be finite".to_string(),
                ))
            }
            _ => {}
        }
        if record.sample_count < record.history.len() as u64 {
            return Err(MonitorError::InvalidCalibration(format!(
                "sample count {} is below history length {}",
                record.sample_count,
                record.history.len()
            )));
        }
        let warmup = self.config.warmup_snapshots;
        if record.warmup_complete != (record.sample_count >= warmup) {
            return Err(MonitorError::InvalidCalibration(format!(
                "sample count {} disagrees with warmup flag {} (warmup is {} snapshots)",
                record.sample_count, record.warmup_complete, warmup
            )));
        }

        self.index.clear();
        for v in &record.history {
            self.index.record(*v);
        }
        self.sample_count = record.sample_count;
        self.thresholds = record.thresholds;
        Ok(())
    }
}

/// Percentile `p` (0–100) with linear interpolation between closest ranks.
///
/// Computed over a sorted copy. `None` for empty input.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
