// ALEC Feed - Polling feeder for the complexity monitor
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Integration tests for the async feeder loop.

use alec_feed::*;
use alec_monitor::{MonitorConfig, MonitorState, SharedMonitor};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fast_config() -> FeedConfig {
    FeedConfig {
        poll_interval: Duration::from_millis(5),
        snapshot_every_n_polls: 1,
    }
}

/// Two coupled sensors plus an unrelated metric family.
fn simulator(step: u32) -> String {
    let t = step as f64 * 0.3;
    format!(
        "# TYPE alec_sensor_value gauge\n\
         alec_sensor_value{{sensor_id=\"temp\"}} {}\n\
         alec_sensor_value{{sensor_id=\"hum\"}} {}\n\
         alec_sensor_quality{{sensor_id=\"temp\"}} 1\n",
        20.0 + t.sin(),
        60.0 - 2.0 * t.sin() + (t * 2.3).cos()
    )
}

// ============================================================================
// Run loop
// ============================================================================

#[tokio::test]
async fn test_run_publishes_and_stops() {
    init_tracing();

    let counter = Arc::new(AtomicU32::new(0));
    let calls = counter.clone();
    let source = ExpositionSource::new(move || {
        let step = calls.fetch_add(1, Ordering::SeqCst);
        if step % 5 == 4 {
            return Err(FeedError::Source("simulator unavailable".to_string()));
        }
        Ok(simulator(step))
    });

    let feeder = Feeder::new(source, SharedMonitor::default(), fast_config()).unwrap();
    let mut handle = feeder.handle();
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(feeder.run(stop_rx));

    let first = tokio::time::timeout(Duration::from_secs(5), handle.next())
        .await
        .expect("no snapshot published")
        .unwrap();
    assert_eq!(first.active_source_count, 2);

    while counter.load(Ordering::SeqCst) < 20 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    stop_tx.send(true).unwrap();

    let stats = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("feeder did not stop")
        .unwrap();
    assert!(stats.polls >= 20);
    assert!(stats.fetch_errors >= 3);
    assert_eq!(stats.polls, stats.successful_polls + stats.fetch_errors);
    assert_eq!(stats.snapshots, stats.successful_polls);

    let latest = handle.latest().unwrap();
    assert_eq!(latest.sample_count, stats.snapshots);
    assert!((0.0..=1.0).contains(&latest.robustness));
}

#[tokio::test]
async fn test_run_exits_when_shutdown_dropped() {
    let source = ExpositionSource::new(|| Ok(simulator(0)));
    let feeder = Feeder::new(source, SharedMonitor::default(), fast_config()).unwrap();
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(feeder.run(stop_rx));

    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(stop_tx);

    let stats = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("feeder did not stop")
        .unwrap();
    assert!(stats.polls >= 1);
}

#[tokio::test]
async fn test_already_stopped_never_polls() {
    let source = ExpositionSource::new(|| Ok(simulator(0)));
    let feeder = Feeder::new(source, SharedMonitor::default(), fast_config()).unwrap();
    let (_stop_tx, stop_rx) = watch::channel(true);

    let stats = feeder.run(stop_rx).await;
    assert_eq!(stats.polls, 0);
}

// ============================================================================
// Shared monitor access
// ============================================================================

#[tokio::test]
async fn test_handle_reset_while_running() {
    let mut config = MonitorConfig::default();
    config.calibration.warmup_snapshots = 5;
    let monitor = SharedMonitor::new(config).unwrap();

    let counter = Arc::new(AtomicU32::new(0));
    let calls = counter.clone();
    let source = ExpositionSource::new(move || Ok(simulator(calls.fetch_add(1, Ordering::SeqCst))));

    let feeder = Feeder::new(source, monitor.clone(), fast_config()).unwrap();
    let handle = feeder.handle();
    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(feeder.run(stop_rx));

    while counter.load(Ordering::SeqCst) < 10 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    stop_tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(monitor.state(), MonitorState::Calibrated);
    let summary = handle.reset();
    assert_eq!(summary.sources_cleared, 2);
    assert!(summary.was_calibrated);
    assert_eq!(handle.monitor().state(), MonitorState::Cold);
}

#[test]
fn test_poll_once_without_runtime() {
    let mut step = 0;
    let source = ExpositionSource::new(move || {
        step += 1;
        Ok(simulator(step))
    });
    let config = FeedConfig {
        snapshot_every_n_polls: 4,
        ..FeedConfig::default()
    };
    let mut feeder = Feeder::new(source, SharedMonitor::default(), config).unwrap();

    let snapshots: Vec<_> = (0..12).filter_map(|_| feeder.poll_once()).collect();
    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[2].sample_count, 3);
    assert_eq!(feeder.stats().readings_accepted, 24);
    assert_eq!(
        feeder.monitor().source_stats("temp").unwrap().window_length,
        12
    );
}
