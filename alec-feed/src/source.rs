// ALEC Feed - Polling feeder for the complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reading sources polled by the feeder.

use crate::error::Result;
use alec_monitor::{ExpositionInput, InputAdapter, Reading};
use tracing::debug;

/// Something the feeder can poll for new readings.
///
/// `fetch` runs on the feeder's task and should return promptly.
pub trait ReadingSource: Send {
    fn fetch(&mut self) -> Result<Vec<Reading>>;
}

/// Source backed by a producer of exposition text.
///
/// The producer is typically a scrape of a simulator's metrics page.
pub struct ExpositionSource<F> {
    producer: F,
    metric: String,
    label: String,
}

impl<F> ExpositionSource<F>
where
    F: FnMut() -> Result<String> + Send,
{
    pub fn new(producer: F) -> Self {
        Self::with_family(
            producer,
            ExpositionInput::DEFAULT_METRIC,
            ExpositionInput::DEFAULT_LABEL,
        )
    }

    /// Read `metric` lines, taking the source id from `label`.
    pub fn with_family(producer: F, metric: &str, label: &str) -> Self {
        Self {
            producer,
            metric: metric.to_string(),
            label: label.to_string(),
        }
    }
}

impl<F> ReadingSource for ExpositionSource<F>
where
    F: FnMut() -> Result<String> + Send,
{
    fn fetch(&mut self) -> Result<Vec<Reading>> {
        let text = (self.producer)()?;
        let input = ExpositionInput::parse_with(&text, &self.metric, &self.label);
        if input.skipped() > 0 {
            debug!(skipped = input.skipped(), "malformed exposition lines");
        }
        Ok(input.into_readings())
    }
}

/// Any input adapter produced on demand is a source.
impl<A, F> ReadingSource for F
where
    A: InputAdapter,
    F: FnMut() -> Result<A> + Send,
{
    fn fetch(&mut self) -> Result<Vec<Reading>> {
        Ok(self()?.readings())
    }
}
