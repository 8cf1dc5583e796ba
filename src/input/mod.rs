// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Input adapters for ComplexityMonitor.
//!
//! Readings can come from:
//! - Text metrics exposition scraped from a simulator (`ExpositionInput`)
//! - Generic JSON batches (`JsonReadings`)
//! - Custom adapters via `InputAdapter` trait

mod exposition;
mod json;

pub use exposition::ExpositionInput;
pub use json::{JsonReading, JsonReadings};

use serde::{Deserialize, Serialize};

/// One `(source_id, value, timestamp)` reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub source_id: String,
    pub value: f64,
    /// Optional source timestamp in milliseconds (UTC epoch).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp_ms: Option<u64>,
}

impl Reading {
    pub fn new(source_id: impl Into<String>, value: f64) -> Self {
        Self {
            source_id: source_id.into(),
            value,
            timestamp_ms: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    /// Whether the monitor would accept this reading.
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }
}

/// Trait for converting external data to readings.
pub trait InputAdapter {
    /// Readings carried by this input, in arrival order.
    fn readings(&self) -> Vec<Reading>;
}
