// ALEC Feed - Polling feeder for the complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # ALEC Feed
//!
//! Drives a [`SharedMonitor`](alec_monitor::SharedMonitor) from a polled
//! reading source:
//! - **Sources**: anything implementing [`ReadingSource`], such as an
//!   exposition page scrape wrapped in [`ExpositionSource`]
//! - **Cadence**: one fetch per `poll_interval`, one snapshot every
//!   `snapshot_every_n_polls` successful fetches
//! - **Publishing**: each snapshot goes out on a `watch` channel readable
//!   through [`FeedHandle`]
//!
//! Fetch failures are logged and counted, never fatal.
//!
//! ## Usage
//!
//! ```rust
//! use alec_feed::{ExpositionSource, FeedConfig, Feeder};
//! use alec_monitor::SharedMonitor;
//!
//! let mut tick = 0.0_f64;
//! let source = ExpositionSource::new(move || {
//!     tick += 1.0;
//!     Ok(format!("alec_sensor_value{{sensor_id=\"temp_01\"}} {}\n", 20.0 + tick.sin()))
//! });
//!
//! let mut feeder = Feeder::new(source, SharedMonitor::default(), FeedConfig::default()).unwrap();
//! let handle = feeder.handle();
//!
//! for _ in 0..15 {
//!     feeder.poll_once();
//! }
//!
//! let latest = handle.latest().unwrap();
//! assert_eq!(latest.sample_count, 15);
//! assert!(latest.entropy_per_source["temp_01"] > 0.0);
//! ```
//!
//! Inside a tokio runtime, `Feeder::run` polls on an interval until a
//! shutdown `watch` flips to `true`.

pub mod config;
pub mod error;
pub mod feeder;
pub mod source;

pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use feeder::{FeedHandle, FeedStats, Feeder};
pub use source::{ExpositionSource, ReadingSource};
