// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Generic JSON input adapter.
//!
//! Example JSON:
//! ```json
//! {
//!   "readings": [
//!     {"source_id": "temp_01", "value": 21.4, "timestamp_ms": 1706000000000},
//!     {"source_id": "hum_01", "value": null}
//!   ]
//! }
//! ```
//!
//! A `null` value is a dropout and becomes NaN, which the monitor ignores.

use super::{InputAdapter, Reading};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// One reading in the JSON batch format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReading {
    pub source_id: String,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp_ms: Option<u64>,
}

/// A batch of readings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonReadings {
    #[serde(default)]
    pub readings: Vec<JsonReading>,
}

impl JsonReadings {
    /// Parse from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Append a reading.
    pub fn push(mut self, source_id: impl Into<String>, value: f64) -> Self {
        self.readings.push(JsonReading {
            source_id: source_id.into(),
            value: Some(value),
            timestamp_ms: None,
        });
        self
    }
}

impl InputAdapter for JsonReadings {
    fn readings(&self) -> Vec<Reading> {
        self.readings
            .iter()
            .map(|r| Reading {
                source_id: r.source_id.clone(),
                value: r.value.unwrap_or(f64::NAN),
                timestamp_ms: r.timestamp_ms,
            })
            .collect()
    }
}
