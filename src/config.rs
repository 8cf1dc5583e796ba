// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Monitor configuration.
//!
//! Defaults reproduce the values the complexity service has always run with
//! (100-sample windows, 20 histogram bins, 50 warmup snapshots, 95th
//! percentile critical threshold, 3-sigma anomalies). `from_env` overlays the
//! service's environment variables on top of those defaults.

use crate::error::{MonitorError, Result};
use serde::{Deserialize, Serialize};

/// Master configuration for the complexity monitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Per-source rolling window.
    pub window: WindowConfig,

    /// Histogram entropy estimation.
    pub entropy: EntropyConfig,

    /// Pairwise correlation.
    pub correlation: CorrelationConfig,

    /// Critical threshold calibration.
    pub calibration: CalibrationConfig,

    /// Total information tracking.
    pub information: InformationConfig,

    /// Per-source anomaly scoring.
    pub anomaly: AnomalyConfig,
}

/// Rolling window configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Maximum finite values retained per source.
    pub capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Entropy estimation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    /// Number of equal-width histogram bins.
    pub bins: usize,
    /// Windows shorter than this have zero entropy.
    pub min_samples: usize,
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            bins: 20,
            min_samples: 10,
        }
    }
}

/// Correlation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Minimum overlapping samples for a pair to count.
    pub min_samples: usize,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { min_samples: 10 }
    }
}

/// Calibration configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Snapshots observed before the critical threshold is frozen.
    pub warmup_snapshots: u64,
    /// Percentile of the complexity history used as critical threshold.
    pub critical_percentile: f64,
    /// Capacity of the complexity history.
    pub history_capacity: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            warmup_snapshots: 50,
            critical_percentile: 95.0,
            history_capacity: 200,
        }
    }
}

/// Total information tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InformationConfig {
    /// Number of recent total-information values kept for the delta.
    pub history: usize,
}

impl Default for InformationConfig {
    fn default() -> Self {
        Self { history: 20 }
    }
}

/// Anomaly scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Finite readings required before the baseline is learned.
    pub min_samples: usize,
    /// Z-score at or above which a reading is flagged.
    pub threshold_sigma: f64,
    /// Baselines with a smaller std are treated as constant.
    pub min_std: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_samples: 20,
            threshold_sigma: 3.0,
            min_std: 1e-6,
        }
    }
}

impl MonitorConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with the service environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from an arbitrary key lookup.
    ///
    /// Recognized keys: `WINDOW_SIZE`, `SHORT_WINDOW`, `ENTROPY_BINS`,
    /// `WARMUP_SAMPLES`, `CORRELATION_MIN_SAMPLES`, `ANOMALY_MIN_SAMPLES`,
    /// `ANOMALY_THRESHOLD_SIGMA`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "WINDOW_SIZE")? {
            config.window.capacity = v;
        }
        if let Some(v) = parse_var(&lookup, "SHORT_WINDOW")? {
            config.information.history = v;
        }
        if let Some(v) = parse_var(&lookup, "ENTROPY_BINS")? {
            config.entropy.bins = v;
        }
        if let Some(v) = parse_var(&lookup, "WARMUP_SAMPLES")? {
            config.calibration.warmup_snapshots = v;
        }
        if let Some(v) = parse_var(&lookup, "CORRELATION_MIN_SAMPLES")? {
            config.correlation.min_samples = v;
        }
        if let Some(v) = parse_var(&lookup, "ANOMALY_MIN_SAMPLES")? {
            config.anomaly.min_samples = v;
        }
        if let Some(v) = parse_var(&lookup, "ANOMALY_THRESHOLD_SIGMA")? {
            config.anomaly.threshold_sigma = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.window.capacity == 0 {
            return Err(invalid("window.capacity must be > 0"));
        }
        if self.entropy.bins == 0 {
            return Err(invalid("entropy.bins must be > 0"));
        }
        if self.correlation.min_samples < 2 {
            return Err(invalid("correlation.min_samples must be >= 2"));
        }
        if self.calibration.history_capacity == 0 {
            return Err(invalid("calibration.history_capacity must be > 0"));
        }
        let p = self.calibration.critical_percentile;
        if !(0.0..=100.0).contains(&p) {
            return Err(invalid("calibration.critical_percentile must be in [0, 100]"));
        }
        if self.information.history < 2 {
            return Err(invalid("information.history must be >= 2"));
        }
        // The baseline is learned from readings still held in the window.
        if self.anomaly.min_samples < 2 || self.anomaly.min_samples > self.window.capacity {
            return Err(MonitorError::InvalidConfig(format!(
                "anomaly.min_samples must be in [2, {}]",
                self.window.capacity
            )));
        }
        if !(self.anomaly.threshold_sigma.is_finite() && self.anomaly.threshold_sigma > 0.0) {
            return Err(invalid("anomaly.threshold_sigma must be > 0"));
        }
        if !(self.anomaly.min_std.is_finite() && self.anomaly.min_std >= 0.0) {
            return Err(invalid("anomaly.min_std must be >= 0"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> MonitorError {
    MonitorError::InvalidConfig(msg.to_string())
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| MonitorError::InvalidConfig(format!("{}: cannot parse {:?}", key, raw))),
    }
}
