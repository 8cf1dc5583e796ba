// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! MonitorSnapshot - output structure consumed by transport adapters.

use crate::correlation::CorrelationPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    /// No sources yet.
    Cold,
    /// Sources present, critical threshold not yet calibrated.
    Accumulating,
    /// Critical threshold frozen.
    Calibrated,
}

impl MonitorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorState::Cold => "cold",
            MonitorState::Accumulating => "accumulating",
            MonitorState::Calibrated => "calibrated",
        }
    }
}

/// Complete result of one `snapshot()` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    /// Wall-clock time the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Lifecycle state after this snapshot.
    pub state: MonitorState,
    /// Snapshots taken since creation or last reset, including this one.
    pub sample_count: u64,
    /// Complexity history length after this snapshot.
    pub history_len: usize,

    pub active_source_count: usize,
    /// Shortest window across sources (0 when there are none).
    pub min_window_length: usize,

    /// H_i per source, in bits.
    pub entropy_per_source: BTreeMap<String, f64>,
    /// H_tot = Σ H_i.
    pub entropy_total: f64,

    /// Complexity index C.
    pub complexity: f64,
    /// Mean |r| over valid pairs.
    pub mean_abs_correlation: f64,
    /// Upper-triangle correlation matrix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub correlations: Vec<CorrelationPair>,

    /// I_tot = H_tot + C.
    pub information_total: f64,
    /// I_tot change since the previous snapshot.
    pub delta_information: f64,

    /// Robustness R in [0, 1].
    pub robustness: f64,
    pub critical_threshold: Option<f64>,
    pub min_observed: Option<f64>,
    pub warmup_complete: bool,

    pub anomaly_score_per_source: BTreeMap<String, f64>,
    pub anomaly_flag_per_source: BTreeMap<String, bool>,
    pub anomaly_count: usize,
}

impl MonitorSnapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sources currently flagged, in id order.
    pub fn anomalous_sources(&self) -> Vec<&str> {
        self.anomaly_flag_per_source
            .iter()
            .filter(|(_, &flag)| flag)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn is_calibrated(&self) -> bool {
        self.state == MonitorState::Calibrated
    }
}

/// What a `reset()` cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub sources_cleared: usize,
    pub history_cleared: usize,
    pub was_calibrated: bool,
}
