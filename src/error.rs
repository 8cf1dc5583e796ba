// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for ALEC Monitor
//!
//! Numeric input never produces an error: non-finite readings are dropped and
//! every degenerate computation has a defined neutral value. Errors only come
//! from configuration, inspection of unknown sources, and calibration
//! persistence.

use thiserror::Error;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Main error type for monitor operations
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Source was never ingested
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Calibration is frozen and cannot be replaced
    #[error("Calibration already complete; reset the monitor before importing")]
    CalibrationLocked,

    /// Calibration record is inconsistent
    #[error("Invalid calibration record: {0}")]
    InvalidCalibration(String),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
