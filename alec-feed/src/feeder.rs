// ALEC Feed - Polling feeder for the complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Polling loop feeding a shared monitor.

use crate::config::FeedConfig;
use crate::error::Result;
use crate::source::ReadingSource;
use alec_monitor::{MonitorSnapshot, ResetSummary, SharedMonitor};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Counters accumulated by a feeder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub polls: u64,
    pub successful_polls: u64,
    pub fetch_errors: u64,
    pub readings_accepted: u64,
    pub snapshots: u64,
}

/// Fetches from a source, ingests into a monitor, snapshots periodically.
pub struct Feeder<S> {
    source: S,
    monitor: SharedMonitor,
    config: FeedConfig,
    stats: FeedStats,
    publisher: watch::Sender<Option<MonitorSnapshot>>,
}

impl<S: ReadingSource> Feeder<S> {
    pub fn new(source: S, monitor: SharedMonitor, config: FeedConfig) -> Result<Self> {
        config.validate()?;
        let (publisher, _) = watch::channel(None);
        Ok(Self {
            source,
            monitor,
            config,
            stats: FeedStats::default(),
            publisher,
        })
    }

    /// Read side for request handlers.
    pub fn handle(&self) -> FeedHandle {
        FeedHandle {
            monitor: self.monitor.clone(),
            latest: self.publisher.subscribe(),
        }
    }

    pub fn monitor(&self) -> &SharedMonitor {
        &self.monitor
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    /// Fetch once and ingest.
    ///
    /// Returns the snapshot taken when this poll completes a snapshot period.
    /// Fetch failures are logged and counted; they do not advance the period.
    pub fn poll_once(&mut self) -> Option<MonitorSnapshot> {
        self.stats.polls += 1;

        let readings = match self.source.fetch() {
            Ok(readings) => readings,
            Err(e) => {
                self.stats.fetch_errors += 1;
                warn!(error = %e, errors = self.stats.fetch_errors, "fetch failed");
                return None;
            }
        };

        self.stats.successful_polls += 1;
        let accepted = self.monitor.ingest_batch(&readings);
        self.stats.readings_accepted += accepted as u64;
        debug!(fetched = readings.len(), accepted, "poll complete");

        if self.stats.successful_polls % self.config.snapshot_every_n_polls != 0 {
            return None;
        }

        let snapshot = self.monitor.snapshot();
        self.stats.snapshots += 1;
        self.publisher.send_replace(Some(snapshot.clone()));
        Some(snapshot)
    }

    /// Poll on `poll_interval` until `shutdown` becomes true or its sender
    /// is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> FeedStats {
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_ms = self.config.poll_interval.as_millis() as u64,
            snapshot_every = self.config.snapshot_every_n_polls,
            "feeder started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(
            polls = self.stats.polls,
            fetch_errors = self.stats.fetch_errors,
            snapshots = self.stats.snapshots,
            "feeder stopped"
        );
        self.stats
    }
}

impl<S> std::fmt::Debug for Feeder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feeder")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Read access to a running feeder's monitor and latest snapshot.
#[derive(Debug, Clone)]
pub struct FeedHandle {
    monitor: SharedMonitor,
    latest: watch::Receiver<Option<MonitorSnapshot>>,
}

impl FeedHandle {
    /// Most recently published snapshot.
    pub fn latest(&self) -> Option<MonitorSnapshot> {
        self.latest.borrow().clone()
    }

    /// Wait for the next published snapshot. `None` once the feeder is gone.
    pub async fn next(&mut self) -> Option<MonitorSnapshot> {
        self.latest.changed().await.ok()?;
        self.latest.borrow_and_update().clone()
    }

    pub fn monitor(&self) -> &SharedMonitor {
        &self.monitor
    }

    pub fn reset(&self) -> ResetSummary {
        self.monitor.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::source::ExpositionSource;
    use alec_monitor::Reading;

    struct Scripted {
        calls: u32,
    }

    impl ReadingSource for Scripted {
        fn fetch(&mut self) -> Result<Vec<Reading>> {
            self.calls += 1;
            if self.calls % 3 == 0 {
                return Err(FeedError::Source("scrape timeout".to_string()));
            }
            Ok(vec![
                Reading::new("a", self.calls as f64),
                Reading::new("b", f64::NAN),
            ])
        }
    }

    #[test]
    fn test_errors_counted_not_fatal() {
        let mut feeder =
            Feeder::new(Scripted { calls: 0 }, SharedMonitor::default(), FeedConfig::default())
                .unwrap();

        let snapshots = (0..6).filter_map(|_| feeder.poll_once()).count();
        let stats = feeder.stats();
        assert_eq!(stats.polls, 6);
        assert_eq!(stats.fetch_errors, 2);
        assert_eq!(stats.successful_polls, 4);
        assert_eq!(stats.readings_accepted, 4);
        assert_eq!(snapshots, 4);
        assert_eq!(feeder.monitor().source_count(), 1);
    }

    #[test]
    fn test_snapshot_period() {
        let config = FeedConfig {
            snapshot_every_n_polls: 3,
            ..FeedConfig::default()
        };
        let source =
            ExpositionSource::new(|| Ok("alec_sensor_value{sensor_id=\"a\"} 1\n".to_string()));
        let mut feeder = Feeder::new(source, SharedMonitor::default(), config).unwrap();
        let handle = feeder.handle();

        assert!(feeder.poll_once().is_none());
        assert!(feeder.poll_once().is_none());
        let snapshot = feeder.poll_once().unwrap();
        assert_eq!(snapshot.sample_count, 1);
        assert_eq!(handle.latest(), Some(snapshot));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FeedConfig {
            snapshot_every_n_polls: 0,
            ..FeedConfig::default()
        };
        let result = Feeder::new(Scripted { calls: 0 }, SharedMonitor::default(), config);
        assert!(matches!(result, Err(FeedError::InvalidConfig(_))));
    }
}
