// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Text metrics exposition input adapter.
//!
//! Extracts sensor readings from a scraped exposition page such as:
//!
//! ```text
//! # HELP alec_sensor_value Current sensor value
//! # TYPE alec_sensor_value gauge
//! alec_sensor_value{sensor_id="temp_01",unit="C"} 21.4
//! alec_sensor_value{sensor_id="hum_01",unit="%"} 63.0 1706000000000
//! ```
//!
//! Only one metric family is read; the source id comes from one label.
//! Malformed lines are skipped and counted, never fatal.

use super::{InputAdapter, Reading};
use tracing::debug;

/// Readings parsed from exposition text.
#[derive(Debug, Clone, Default)]
pub struct ExpositionInput {
    readings: Vec<Reading>,
    skipped: usize,
}

impl ExpositionInput {
    /// Metric family published by the sensor simulators.
    pub const DEFAULT_METRIC: &'static str = "alec_sensor_value";
    /// Label carrying the source id.
    pub const DEFAULT_LABEL: &'static str = "sensor_id";

    /// Parse with the default metric family and label.
    pub fn parse(text: &str) -> Self {
        Self::parse_with(text, Self::DEFAULT_METRIC, Self::DEFAULT_LABEL)
    }

    /// Parse lines of `metric`, taking the source id from `label`.
    pub fn parse_with(text: &str, metric: &str, label: &str) -> Self {
        let mut input = Self::default();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(rest) = line.strip_prefix(metric) else {
                continue;
            };
            // Another family sharing the prefix, e.g. `alec_sensor_value_total`.
            if !(rest.starts_with('{') || rest.starts_with(char::is_whitespace)) {
                continue;
            }

            match parse_sample(rest, label) {
                Some(reading) => input.readings.push(reading),
                None => {
                    debug!(line = line_no + 1, "skipping malformed exposition line");
                    input.skipped += 1;
                }
            }
        }

        input
    }

    /// Lines of the selected family that could not be parsed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn into_readings(self) -> Vec<Reading> {
        self.readings
    }
}

impl InputAdapter for ExpositionInput {
    fn readings(&self) -> Vec<Reading> {
        self.readings.clone()
    }
}

/// Parse `{labels} value [timestamp]` (the part after the metric name).
fn parse_sample(rest: &str, label: &str) -> Option<Reading> {
    let rest = rest.trim_start();
    let body = rest.strip_prefix('{')?;
    let (labels, tail) = split_labels(body)?;

    let source_id = labels
        .into_iter()
        .find(|(name, _)| name == label)
        .map(|(_, value)| value)
        .filter(|id| !id.is_empty())?;

    let mut fields = tail.split_whitespace();
    let value: f64 = fields.next()?.parse().ok()?;
    let timestamp_ms = match fields.next() {
        Some(ts) => Some(ts.parse::<u64>().ok()?),
        None => None,
    };
    if fields.next().is_some() {
        return None;
    }

    Some(Reading {
        source_id,
        value,
        timestamp_ms,
    })
}

/// Parse a label set up to the closing brace.
///
/// Returns the `(name, value)` pairs and the text after `}`.
fn split_labels(body: &str) -> Option<(Vec<(String, String)>, &str)> {
    let mut labels = Vec::new();
    let mut chars = body.char_indices().peekable();

    loop {
        // Skip separators.
        while let Some(&(_, c)) = chars.peek() {
            if c == ',' || c.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }

        let (start, c) = chars.next()?;
        if c == '}' {
            return Some((labels, &body[start + 1..]));
        }

        // Label name up to '='.
        let mut name = String::new();
        name.push(c);
        loop {
            let (_, c) = chars.next()?;
            if c == '=' {
                break;
            }
            name.push(c);
        }

        // Quoted value with escapes.
        let (_, quote) = chars.next()?;
        if quote != '"' {
            return None;
        }
        let mut value = String::new();
        loop {
            let (_, c) = chars.next()?;
            match c {
                '"' => break,
                '\\' => {
                    let (_, escaped) = chars.next()?;
                    value.push(match escaped {
                        'n' => '\n',
                        other => other,
                    });
                }
                other => value.push(other),
            }
        }

        labels.push((name.trim().to_string(), value));
    }
}
