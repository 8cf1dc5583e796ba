// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # ALEC Monitor
//!
//! Streaming complexity and anomaly monitoring for multi-sensor systems.
//!
//! The monitor ingests `(source_id, value)` readings, keeps a bounded rolling
//! window per source, and derives on demand:
//! - **Entropy**: per-source histogram Shannon entropy (H_i) and the total H_tot
//! - **Complexity**: a correlation-based index C, maximal for moderately
//!   coupled sources and zero for independent or redundant ones
//! - **Robustness**: distance of C from a critical threshold calibrated
//!   during warmup
//! - **Anomalies**: per-source z-scores against a frozen baseline
//!
//! ## Quick Start
//!
//! ```rust
//! use alec_monitor::{ComplexityMonitor, MonitorConfig, MonitorState};
//!
//! let mut config = MonitorConfig::default();
//! config.calibration.warmup_snapshots = 5;
//! let mut monitor = ComplexityMonitor::new(config).unwrap();
//!
//! for step in 0..60 {
//!     let t = step as f64 * 0.2;
//!     monitor.ingest("temperature", 20.0 + t.sin());
//!     monitor.ingest("humidity", 60.0 - 3.0 * t.sin() + (t * 3.1).cos());
//!     monitor.ingest("pressure", 1013.0 + (t * 0.7).cos());
//!
//!     // One snapshot per observation period.
//!     let snapshot = monitor.snapshot();
//!     assert!((0.0..=1.0).contains(&snapshot.robustness));
//! }
//!
//! assert_eq!(monitor.state(), MonitorState::Calibrated);
//! let snapshot = monitor.snapshot();
//! assert_eq!(snapshot.active_source_count, 3);
//! assert!(snapshot.entropy_total > 0.0);
//! ```
//!
//! ## Sharing between threads
//!
//! [`SharedMonitor`] wraps one monitor behind a single lock, so an ingest
//! loop and a request handler can use it concurrently:
//!
//! ```rust
//! use alec_monitor::SharedMonitor;
//!
//! let monitor = SharedMonitor::default();
//! let feeder = monitor.clone();
//! std::thread::spawn(move || feeder.ingest("sensor_01", 9.8))
//!     .join()
//!     .unwrap();
//!
//! assert_eq!(monitor.snapshot().active_source_count, 1);
//! monitor.reset();
//! assert_eq!(monitor.source_count(), 0);
//! ```
//!
//! ## Key Concepts
//!
//! ### Warmup and calibration
//!
//! Every `snapshot()` call appends the complexity value to a bounded history.
//! When the number of snapshots reaches `calibration.warmup_snapshots`, the
//! 95th percentile and the minimum of that history are frozen as the critical
//! threshold and floor. Robustness is 1.0 until then.
//!
//! ### Missing values
//!
//! NaN and infinite readings are dropped on ingest. They never create a
//! source and never enter a window or a baseline.
//!
//! ## Modules
//!
//! - [`window`]: Fixed-capacity rolling window
//! - [`entropy`]: Histogram entropy
//! - [`correlation`]: Pairwise Pearson correlation
//! - [`complexity`]: Complexity index and history
//! - [`calibration`]: Critical threshold calibration
//! - [`robustness`]: Robustness score and information delta
//! - [`anomaly`]: Frozen-baseline anomaly scoring
//! - [`monitor`]: The orchestrating monitor
//! - [`input`]: Exposition text and JSON input adapters

// Core modules
pub mod anomaly;
pub mod calibration;
pub mod complexity;
pub mod config;
pub mod correlation;
pub mod entropy;
pub mod error;
pub mod input;
pub mod monitor;
pub mod robustness;
pub mod shared;
pub mod snapshot;
pub mod window;

// Re-exports for convenience
pub use anomaly::{AnomalyDetector, AnomalyVerdict, Baseline};
pub use calibration::{CalibrationRecord, CriticalityCalibrator, Thresholds};
pub use complexity::ComplexityIndex;
pub use config::MonitorConfig;
pub use correlation::{CorrelationPair, CorrelationTracker};
pub use entropy::EntropyEstimator;
pub use error::{MonitorError, Result};
pub use input::{ExpositionInput, InputAdapter, JsonReadings, Reading};
pub use monitor::{ComplexityMonitor, SourceStats};
pub use robustness::{InformationTracker, RobustnessEstimator};
pub use shared::SharedMonitor;
pub use snapshot::{MonitorSnapshot, MonitorState, ResetSummary};
pub use window::RollingBuffer;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_exposition_to_snapshot() {
        let mut monitor = ComplexityMonitor::default();

        for step in 0..30 {
            let page = format!(
                "alec_sensor_value{{sensor_id=\"a\"}} {}\nalec_sensor_value{{sensor_id=\"b\"}} {}\n",
                step as f64,
                (step * 2) as f64
            );
            let input = ExpositionInput::parse(&page);
            monitor.ingest_batch(&input.readings());
        }

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.active_source_count, 2);
        assert_eq!(snapshot.min_window_length, 30);
        // Perfectly correlated ramps contribute no complexity.
        assert!(snapshot.complexity.abs() < 1e-9);
        assert!((snapshot.mean_abs_correlation - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut monitor = ComplexityMonitor::default();
        monitor.ingest("a", 1.0);
        let snapshot = monitor.snapshot();

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"entropy_total\""));
        assert!(json.contains("\"state\":\"accumulating\""));

        let restored = MonitorSnapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);
    }
}
