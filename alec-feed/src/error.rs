// ALEC Feed - Polling feeder for the complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for the feeder.

use alec_monitor::MonitorError;
use thiserror::Error;

/// Result type alias for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Error, Debug)]
pub enum FeedError {
    /// The reading source failed to produce data
    #[error("Source error: {0}")]
    Source(String),

    /// Monitor rejected an operation
    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),

    /// Invalid feeder configuration
    #[error("Invalid feed configuration: {0}")]
    InvalidConfig(String),
}
