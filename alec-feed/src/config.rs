// ALEC Feed - Polling feeder for the complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Feeder configuration.

use crate::error::{FeedError, Result};
use std::time::Duration;

/// Polling cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Delay between two fetches.
    pub poll_interval: Duration,
    /// Take a snapshot after this many successful polls.
    pub snapshot_every_n_polls: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            snapshot_every_n_polls: 1,
        }
    }
}

impl FeedConfig {
    /// Defaults overlaid with `POLL_INTERVAL` (seconds) and `SNAPSHOT_EVERY`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("POLL_INTERVAL") {
            let secs: f64 = raw
                .trim()
                .parse()
                .map_err(|_| FeedError::InvalidConfig(format!("POLL_INTERVAL: {:?}", raw)))?;
            if !(secs.is_finite() && secs > 0.0) {
                return Err(FeedError::InvalidConfig(
                    "POLL_INTERVAL must be a positive number of seconds".to_string(),
                ));
            }
            config.poll_interval = Duration::from_secs_f64(secs);
        }

        if let Some(raw) = lookup("SNAPSHOT_EVERY") {
            config.snapshot_every_n_polls = raw
                .trim()
                .parse()
                .map_err(|_| FeedError::InvalidConfig(format!("SNAPSHOT_EVERY: {:?}", raw)))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(FeedError::InvalidConfig(
                "poll_interval must be > 0".to_string(),
            ));
        }
        if self.snapshot_every_n_polls == 0 {
            return Err(FeedError::InvalidConfig(
                "snapshot_every_n_polls must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
