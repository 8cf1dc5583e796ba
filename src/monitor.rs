// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! ComplexityMonitor - main orchestration for the monitor.

use crate::anomaly::{AnomalyDetector, Baseline};
use crate::calibration::{CalibrationRecord, CriticalityCalibrator, Thresholds};
use crate::complexity::ComplexityIndex;
use crate::config::MonitorConfig;
use crate::correlation::CorrelationTracker;
use crate::entropy::EntropyEstimator;
use crate::error::{MonitorError, Result};
use crate::input::Reading;
use crate::robustness::{InformationTracker, RobustnessEstimator};
use crate::snapshot::{MonitorSnapshot, MonitorState, ResetSummary};
use crate::window::RollingBuffer;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-source record, created on the first finite reading.
#[derive(Debug, Clone)]
struct SourceState {
    window: RollingBuffer,
    anomaly: AnomalyDetector,
}

/// Inspection view of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub source_id: String,
    pub window_length: usize,
    /// Finite readings accepted since creation or last reset.
    pub readings: u64,
    pub latest: Option<f64>,
    pub entropy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<Baseline>,
}

/// Main monitor orchestrating all components.
pub struct ComplexityMonitor {
    config: MonitorConfig,
    sources: BTreeMap<String, SourceState>,
    entropy: EntropyEstimator,
    correlation: CorrelationTracker,
    calibrator: CriticalityCalibrator,
    information: InformationTracker,
    /// Last snapshot output.
    last_snapshot: Option<MonitorSnapshot>,
}

impl ComplexityMonitor {
    /// Create a monitor after validating `config`.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: MonitorConfig) -> Self {
        Self {
            entropy: EntropyEstimator::new(&config.entropy),
            correlation: CorrelationTracker::new(&config.correlation),
            calibrator: CriticalityCalibrator::new(config.calibration.clone()),
            information: InformationTracker::new(config.information.history),
            sources: BTreeMap::new(),
            last_snapshot: None,
            config,
        }
    }

    /// Ingest one reading. Non-finite values are dropped and return false.
    pub fn ingest(&mut self, source_id: &str, value: f64) -> bool {
        if !value.is_finite() {
            debug!(source = source_id, value, "dropping non-finite reading");
            return false;
        }

        let capacity = self.config.window.capacity;
        let state = self
            .sources
            .entry(source_id.to_string())
            .or_insert_with(|| {
                debug!(source = source_id, "new source");
                SourceState {
                    window: RollingBuffer::new(capacity),
                    anomaly: AnomalyDetector::new(),
                }
            });

        state.window.push(value);
        if state.anomaly.observe(value, &state.window, &self.config.anomaly) {
            if let Some(b) = state.anomaly.baseline() {
                debug!(source = source_id, mean = b.mean, std = b.std, "baseline learned");
            }
        }
        true
    }

    /// Ingest a structured reading.
    pub fn ingest_reading(&mut self, reading: &Reading) -> bool {
        self.ingest(&reading.source_id, reading.value)
    }

    /// Ingest many readings, returning how many were accepted.
    pub fn ingest_batch<'a, I>(&mut self, readings: I) -> usize
    where
        I: IntoIterator<Item = &'a Reading>,
    {
        readings
            .into_iter()
            .filter(|r| self.ingest_reading(r))
            .count()
    }

    /// Recompute all metrics from the current windows.
    ///
    /// Windows are not modified, but every call advances the snapshot count,
    /// the complexity history and the information history. Call once per
    /// observation period, not per reading.
    pub fn snapshot(&mut self) -> MonitorSnapshot {
        let windows: Vec<(&str, Vec<f64>)> = self
            .sources
            .iter()
            .map(|(id, s)| (id.as_str(), s.window.values().collect()))
            .collect();

        let entropy_per_source: BTreeMap<String, f64> = windows
            .iter()
            .map(|(id, values)| (id.to_string(), self.entropy.entropy(values)))
            .collect();
        let entropy_total = entropy_per_source.values().fold(0.0, |acc, h| acc + h);

        let slices: Vec<(&str, &[f64])> = windows
            .iter()
            .map(|(id, values)| (*id, values.as_slice()))
            .collect();
        let correlations = self.correlation.matrix(&slices);
        let complexity = ComplexityIndex::complexity(&correlations);
        let mean_abs_correlation = CorrelationTracker::mean_abs(&correlations);
        let min_window_length = windows.iter().map(|(_, v)| v.len()).min().unwrap_or(0);

        let mut anomaly_score_per_source = BTreeMap::new();
        let mut anomaly_flag_per_source = BTreeMap::new();
        for (id, state) in &self.sources {
            let verdict = state.anomaly.current(&self.config.anomaly);
            anomaly_score_per_source.insert(id.clone(), verdict.score);
            anomaly_flag_per_source.insert(id.clone(), verdict.is_anomaly);
        }
        let anomaly_count = anomaly_flag_per_source.values().filter(|&&f| f).count();

        if self.calibrator.observe(complexity) {
            if let Some(t) = self.calibrator.thresholds() {
                info!(
                    c_critical = t.c_critical,
                    c_min = t.c_min,
                    history = self.calibrator.history_len(),
                    "complexity calibration complete"
                );
            }
        }

        let information_total = entropy_total + complexity;
        let delta_information = self.information.record(information_total);

        let thresholds = self.calibrator.thresholds();
        let robustness = RobustnessEstimator::robustness(thresholds, complexity);

        let snapshot = MonitorSnapshot {
            timestamp: Utc::now(),
            state: self.state(),
            sample_count: self.calibrator.sample_count(),
            history_len: self.calibrator.history_len(),
            active_source_count: self.sources.len(),
            min_window_length,
            entropy_per_source,
            entropy_total,
            complexity,
            mean_abs_correlation,
            correlations,
            information_total,
            delta_information,
            robustness,
            critical_threshold: thresholds.map(|t| t.c_critical),
            min_observed: thresholds.map(|t| t.c_min),
            warmup_complete: thresholds.is_some(),
            anomaly_score_per_source,
            anomaly_flag_per_source,
            anomaly_count,
        };

        self.last_snapshot = Some(snapshot.clone());
        snapshot
    }

    /// Clear every buffer, baseline and calibration value.
    pub fn reset(&mut self) -> ResetSummary {
        let summary = ResetSummary {
            sources_cleared: self.sources.len(),
            history_cleared: self.calibrator.history_len(),
            was_calibrated: self.calibrator.is_complete(),
        };

        self.sources.clear();
        self.calibrator.reset();
        self.information.clear();
        self.last_snapshot = None;

        info!(
            sources = summary.sources_cleared,
            history = summary.history_cleared,
            "monitor reset"
        );
        summary
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        if self.calibrator.is_complete() {
            MonitorState::Calibrated
        } else if self.sources.is_empty() {
            MonitorState::Cold
        } else {
            MonitorState::Accumulating
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_complete()
    }

    /// Frozen thresholds, once calibrated.
    pub fn calibration(&self) -> Option<Thresholds> {
        self.calibrator.thresholds()
    }

    /// Warmup progress in [0, 1].
    pub fn warmup_progress(&self) -> f64 {
        self.calibrator.progress()
    }

    /// Snapshots taken since creation or last reset.
    pub fn sample_count(&self) -> u64 {
        self.calibrator.sample_count()
    }

    pub fn history_len(&self) -> usize {
        self.calibrator.history_len()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Known source ids in order.
    pub fn source_ids(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    /// Inspect one source.
    pub fn source_stats(&self, source_id: &str) -> Result<SourceStats> {
        let state = self
            .sources
            .get(source_id)
            .ok_or_else(|| MonitorError::UnknownSource(source_id.to_string()))?;

        Ok(SourceStats {
            source_id: source_id.to_string(),
            window_length: state.window.len(),
            readings: state.anomaly.observed(),
            latest: state.window.latest(),
            entropy: self.entropy.entropy(&state.window.to_vec()),
            baseline: state.anomaly.baseline(),
        })
    }

    pub fn last_snapshot(&self) -> Option<&MonitorSnapshot> {
        self.last_snapshot.as_ref()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Export calibration state (history, counters, thresholds) as JSON.
    pub fn export_calibration(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.calibrator.export())?)
    }

    /// Restore calibration state exported by another monitor.
    ///
    /// Refused with `CalibrationLocked` once this monitor is calibrated.
    pub fn import_calibration(&mut self, json: &str) -> Result<()> {
        let record: CalibrationRecord = serde_json::from_str(json)?;
        self.calibrator.import(record)?;
        info!(
            sample_count = self.calibrator.sample_count(),
            calibrated = self.calibrator.is_complete(),
            "calibration imported"
        );
        Ok(())
    }
}

impl Default for ComplexityMonitor {
    fn default() -> Self {
        Self::build(MonitorConfig::default())
    }
}

impl std::fmt::Debug for ComplexityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplexityMonitor")
            .field("state", &self.state())
            .field("sources", &self.sources.len())
            .field("sample_count", &self.calibrator.sample_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn small_config() -> MonitorConfig {
        let mut config = MonitorConfig::default();
        config.calibration.warmup_snapshots = 3;
        config.anomaly.min_samples = 5;
        config
    }

    #[test]
    fn test_monitor_creation() {
        let monitor = ComplexityMonitor::default();
        assert_eq!(monitor.state(), MonitorState::Cold);
        assert_eq!(monitor.source_count(), 0);
        assert_eq!(monitor.sample_count(), 0);
        assert!(monitor.last_snapshot().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MonitorConfig::default();
        config.window.capacity = 0;
        assert!(ComplexityMonitor::new(config).is_err());
    }

    #[test]
    fn test_non_finite_dropped() {
        let mut monitor = ComplexityMonitor::default();
        assert!(!monitor.ingest("x", f64::NAN));
        assert!(!monitor.ingest("x", f64::INFINITY));
        assert!(!monitor.ingest("x", f64::NEG_INFINITY));
        assert_eq!(monitor.source_count(), 0);
        assert_eq!(monitor.state(), MonitorState::Cold);

        assert!(monitor.ingest("x", 1.0));
        assert_eq!(monitor.state(), MonitorState::Accumulating);
    }

    #[test]
    fn test_repeated_ingest_reuses_source() {
        let mut monitor = ComplexityMonitor::default();
        for i in 0..25 {
            assert!(monitor.ingest("temp", i as f64));
        }
        assert!(monitor.ingest("hum", 1.0));

        assert_eq!(monitor.source_count(), 2);
        let stats = monitor.source_stats("temp").unwrap();
        assert_eq!(stats.window_length, 25);
        assert_eq!(stats.readings, 25);
        assert_eq!(stats.latest, Some(24.0));
        assert!(stats.baseline.is_some());
        assert_eq!(monitor.source_stats("hum").unwrap().window_length, 1);
    }

    #[test]
    fn test_window_capacity_enforced() {
        let mut config = MonitorConfig::default();
        config.window.capacity = 25;
        let mut monitor = ComplexityMonitor::new(config).unwrap();
        for i in 0..100 {
            monitor.ingest("s", i as f64);
        }
        let stats = monitor.source_stats("s").unwrap();
        assert_eq!(stats.window_length, 25);
        assert_eq!(stats.readings, 25);
        assert_eq!(stats.readings, 100);
        assert_eq!(stats.latest, Some(99.0));
    }

    #[test]
    fn test_unknown_source() {
        let monitor = ComplexityMonitor::default();
        let err = monitor.source_stats("ghost").unwrap_err();
        assert!(matches!(err, MonitorError::UnknownSource(id) if id == "ghost"));
    }

    #[test]
    fn test_snapshot_advances_history() {
        let mut monitor = ComplexityMonitor::default();
        monitor.ingest("a", 1.0);
        let first = monitor.snapshot();
        let second = monitor.snapshot();
        assert_eq!(first.sample_count, 1);
        assert_eq!(second.sample_count, 2);
        assert_eq!(second.history_len, 2);
        assert_eq!(monitor.last_snapshot().unwrap().sample_count, 2);
    }

    #[test]
    fn test_state_transitions() {
        let mut monitor = ComplexityMonitor::new(small_config()).unwrap();
        assert_eq!(monitor.state(), MonitorState::Cold);

        monitor.ingest("a", 1.0);
        assert_eq!(monitor.state(), MonitorState::Accumulating);

        for _ in 0..3 {
            monitor.snapshot();
        }
        assert_eq!(monitor.state(), MonitorState::Calibrated);

        monitor.reset();
        assert_eq!(monitor.state(), MonitorState::Cold);
    }

    #[test]
    fn test_reset_summary() {
        let mut monitor = ComplexityMonitor::new(small_config()).unwrap();
        monitor.ingest("a", 1.0);
        monitor.ingest("b", 2.0);
        for _ in 0..4 {
            monitor.snapshot();
        }

        let summary = monitor.reset();
        assert_eq!(summary.sources_cleared, 2);
        assert_eq!(summary.history_cleared, 4);
        assert!(summary.was_calibrated);

        let again = monitor.reset();
        assert_eq!(again.sources_cleared, 0);
        assert_eq!(again.history_cleared, 0);
        assert!(!again.was_calibrated);
    }

    #[test]
    fn test_source_stats_baseline() {
        let mut monitor = ComplexityMonitor::new(small_config()).unwrap();
        for v in [1.0, 3.0, 1.0, 3.0, 2.0] {
            monitor.ingest("s", v);
        }
        let baseline = monitor.source_stats("s").unwrap().baseline.unwrap();
        assert_abs_diff_eq!(baseline.mean, 2.0);
        assert_abs_diff_eq!(baseline.std, 1.0);
    }

    #[test]
    fn test_ingest_batch_counts_accepted() {
        let mut monitor = ComplexityMonitor::default();
        let readings = vec![
            Reading::new("a", 1.0),
            Reading::new("a", f64::NAN),
            Reading::new("b", 2.0).with_timestamp(1_000),
        ];
        assert_eq!(monitor.ingest_batch(&readings), 2);
        assert_eq!(monitor.source_ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_calibration_export_import() {
        let mut monitor = ComplexityMonitor::new(small_config()).unwrap();
        monitor.ingest("a", 1.0);
        for _ in 0..3 {
            monitor.snapshot();
        }
        let exported = monitor.export_calibration().unwrap();

        let mut restored = ComplexityMonitor::new(small_config()).unwrap();
        restored.import_calibration(&exported).unwrap();
        assert!(restored.is_calibrated());
        assert_eq!(restored.calibration(), monitor.calibration());
        assert_eq!(restored.sample_count(), 3);

        let err = restored.import_calibration(&exported).unwrap_err();
        assert!(matches!(err, MonitorError::CalibrationLocked));

        let err = restored.import_calibration("not json").unwrap_err();
        assert!(matches!(err, MonitorError::Json(_)));
    }

    #[test]
    fn test_import_cannot_skip_warmup() {
        let mut monitor = ComplexityMonitor::default();
        let err = monitor
            .import_calibration(r#"{"sample_count":1000,"warmup_complete":false,"history":[]}"#)
            .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidCalibration(_)));

        monitor.ingest("a", 1.0);
        let snapshot = monitor.snapshot();
        assert!(!snapshot.warmup_complete);
        assert_eq!(snapshot.sample_count, 1);
        assert_eq!(snapshot.critical_threshold, None);
    }
}
