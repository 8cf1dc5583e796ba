// ALEC Monitor - Streaming complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Thread-safe monitor handle.
//!
//! A background loop ingesting readings and a request path taking snapshots
//! or resetting share one `SharedMonitor`. Every call runs inside the same
//! critical section, so a snapshot never sees a half-updated source set and a
//! reset is never partially observable.

use crate::calibration::Thresholds;
use crate::config::MonitorConfig;
use crate::error::Result;
use crate::input::Reading;
use crate::monitor::{ComplexityMonitor, SourceStats};
use crate::snapshot::{MonitorSnapshot, MonitorState, ResetSummary};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to one monitor instance.
#[derive(Clone, Default)]
pub struct SharedMonitor {
    inner: Arc<Mutex<ComplexityMonitor>>,
}

impl SharedMonitor {
    pub fn new(config: MonitorConfig) -> Result<Self> {
        Ok(Self::from_monitor(ComplexityMonitor::new(config)?))
    }

    pub fn from_monitor(monitor: ComplexityMonitor) -> Self {
        Self {
            inner: Arc::new(Mutex::new(monitor)),
        }
    }

    // Monitor state is consistent between calls; recover from poisoning.
    fn lock(&self) -> MutexGuard<'_, ComplexityMonitor> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn ingest(&self, source_id: &str, value: f64) -> bool {
        self.lock().ingest(source_id, value)
    }

    /// Ingest a batch under a single lock acquisition.
    pub fn ingest_batch(&self, readings: &[Reading]) -> usize {
        self.lock().ingest_batch(readings)
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        self.lock().snapshot()
    }

    pub fn reset(&self) -> ResetSummary {
        self.lock().reset()
    }

    pub fn state(&self) -> MonitorState {
        self.lock().state()
    }

    pub fn calibration(&self) -> Option<Thresholds> {
        self.lock().calibration()
    }

    pub fn source_count(&self) -> usize {
        self.lock().source_count()
    }

    pub fn source_stats(&self, source_id: &str) -> Result<SourceStats> {
        self.lock().source_stats(source_id)
    }

    pub fn last_snapshot(&self) -> Option<MonitorSnapshot> {
        self.lock().last_snapshot().cloned()
    }

    pub fn export_calibration(&self) -> Result<String> {
        self.lock().export_calibration()
    }

    pub fn import_calibration(&self, json: &str) -> Result<()> {
        self.lock().import_calibration(json)
    }

    /// Run `f` with exclusive access to the monitor.
    pub fn with<R>(&self, f: impl FnOnce(&mut ComplexityMonitor) -> R) -> R {
        f(&mut self.lock())
    }
}

impl std::fmt::Debug for SharedMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SharedMonitor").field(&*self.lock()).finish()
    }
}
