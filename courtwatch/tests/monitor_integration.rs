//! Integration tests for the monitoring daemon.
//!
//! These tests verify the complete monitoring flow:
//! - Samples sent over the channel → state machine → transition events
//! - Cooldown gating and delivery-sink acknowledgment
//! - Shutdown via channel close and via cancellation
//!
//! Run with: `cargo test --test monitor_integration`

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use courtwatch::geo::{offset_north, GeoPoint};
use courtwatch::geofence::{PositionSample, Region, TransitionKind};
use courtwatch::notification::{DeliveryError, Notification, NotificationSink};
use courtwatch::session::{
    MonitorDaemon, MonitoringSession, NotificationOutcome, SampleOutcome,
    DEFAULT_SAMPLE_CHANNEL_CAPACITY,
};

// ============================================================================
// Helpers
// ============================================================================

/// Sink that records every notification it receives.
#[derive(Default)]
struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
    fail_next: Mutex<usize>,
}

impl RecordingSink {
    fn failing(times: usize) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail_next: Mutex::new(times),
        }
    }

    fn region_ids(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.region_id.clone())
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        Box::pin(async move {
            {
                let mut fail = self.fail_next.lock().unwrap();
                if *fail > 0 {
                    *fail -= 1;
                    return Err(DeliveryError::Unavailable("push service down".to_string()));
                }
            }
            self.delivered.lock().unwrap().push(notification.clone());
            Ok(())
        })
    }
}

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T18:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn at(point: GeoPoint, minutes: i64) -> PositionSample {
    PositionSample::with_timestamp(
        point.latitude,
        point.longitude,
        t0() + Duration::minutes(minutes),
    )
}

fn region_a() -> Region {
    Region::new("A", GeoPoint::new(1.0, 1.0), 100.0)
}

async fn drain(mut rx: mpsc::UnboundedReceiver<SampleOutcome>) -> Vec<SampleOutcome> {
    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    outcomes
}

// ============================================================================
// Tests
// ============================================================================

/// Inside → outside → inside yields Enter, Exit, Enter in order.
#[tokio::test]
async fn test_enter_exit_enter_through_channel() {
    let sink = Arc::new(RecordingSink::default());
    let session = MonitoringSession::new(vec![region_a()], Arc::clone(&sink));
    let (daemon, tx) = MonitorDaemon::new(session, DEFAULT_SAMPLE_CHANNEL_CAPACITY);
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let daemon = daemon.with_subscriber(outcome_tx);

    let handle = tokio::spawn(daemon.run(CancellationToken::new()));

    let center = region_a().center;
    let away = offset_north(center, 1.0);
    tx.send(at(center, 0)).await.unwrap();
    tx.send(at(away, 1)).await.unwrap();
    tx.send(at(center, 2)).await.unwrap();
    drop(tx);

    let session = handle.await.unwrap();
    let outcomes = drain(outcome_rx).await;

    let kinds: Vec<_> = outcomes
        .iter()
        .flat_map(|o| o.events())
        .map(|e| (e.region_id.clone(), e.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("A".to_string(), TransitionKind::Enter),
            ("A".to_string(), TransitionKind::Exit),
            ("A".to_string(), TransitionKind::Enter),
        ]
    );

    // Only the first transition clears the 15 minute cooldown
    assert_eq!(sink.region_ids(), vec!["A".to_string()]);
    assert!(session.membership().is_inside("A"));
    assert_eq!(session.stats().suppressed, 2);
}

/// Duplicate samples never produce a second event.
#[tokio::test]
async fn test_duplicate_samples_are_idempotent() {
    let sink = Arc::new(RecordingSink::default());
    let session = MonitoringSession::new(vec![region_a()], Arc::clone(&sink));
    let (daemon, tx) = MonitorDaemon::new(session, 4);
    let handle = tokio::spawn(daemon.run(CancellationToken::new()));

    let sample = at(region_a().center, 0);
    for _ in 0..5 {
        tx.send(sample).await.unwrap();
    }
    drop(tx);

    let session = handle.await.unwrap();
    assert_eq!(session.stats().samples, 5);
    assert_eq!(session.stats().enters, 1);
    assert_eq!(sink.region_ids().len(), 1);
}

/// Cooldown suppresses re-entry within 15 minutes and allows it afterwards.
#[tokio::test]
async fn test_cooldown_window() {
    let sink = Arc::new(RecordingSink::default());
    let session = MonitoringSession::new(vec![region_a()], Arc::clone(&sink));
    let (daemon, tx) = MonitorDaemon::new(session, 16);
    let handle = tokio::spawn(daemon.run(CancellationToken::new()));

    let center = region_a().center;
    let away = offset_north(center, 1.0);
    // enter@0 (notify), exit@5, enter@10 (suppressed), exit@20 (notify)
    for (point, minute) in [(center, 0), (away, 5), (center, 10), (away, 20)] {
        tx.send(at(point, minute)).await.unwrap();
    }
    drop(tx);

    let session = handle.await.unwrap();
    assert_eq!(sink.region_ids().len(), 2);
    assert_eq!(
        session.gate().state().last_notified_at("A"),
        Some(t0() + Duration::minutes(20))
    );
}

/// A failed delivery does not start the cooldown; the next transition retries.
#[tokio::test]
async fn test_failed_delivery_retries_on_next_transition() {
    let sink = Arc::new(RecordingSink::failing(1));
    let session = MonitoringSession::new(vec![region_a()], Arc::clone(&sink));
    let (daemon, tx) = MonitorDaemon::new(session, 16);
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(daemon.with_subscriber(outcome_tx).run(CancellationToken::new()));

    let center = region_a().center;
    tx.send(at(center, 0)).await.unwrap();
    tx.send(at(offset_north(center, 1.0), 1)).await.unwrap();
    drop(tx);

    let session = handle.await.unwrap();
    let outcomes = drain(outcome_rx).await;

    assert!(matches!(
        outcomes[0].transitions[0].1,
        NotificationOutcome::Failed { .. }
    ));
    assert_eq!(outcomes[1].transitions[0].1, NotificationOutcome::Delivered);
    assert_eq!(session.stats().failed, 1);
    assert_eq!(session.stats().delivered, 1);
    // Membership is unaffected by delivery outcome
    assert!(!session.membership().is_inside("A"));
}

/// Several producers share one ordering point.
#[tokio::test]
async fn test_multiple_producers_single_writer() {
    let regions = vec![
        region_a(),
        Region::new("B", GeoPoint::new(10.0, 10.0), 500.0),
    ];
    let session = MonitoringSession::new(regions, Arc::new(RecordingSink::default()));
    let (daemon, tx) = MonitorDaemon::new(session, 8);
    let handle = tokio::spawn(daemon.run(CancellationToken::new()));

    let foreground = tx.clone();
    let background = tx;
    let fg = tokio::spawn(async move {
        foreground.send(at(GeoPoint::new(1.0, 1.0), 0)).await.unwrap();
    });
    let bg = tokio::spawn(async move {
        background.send(at(GeoPoint::new(10.0, 10.0), 0)).await.unwrap();
    });
    fg.await.unwrap();
    bg.await.unwrap();

    let session = handle.await.unwrap();
    assert_eq!(session.stats().samples, 2);
    // Whichever sample came last determines the final membership
    let inside = session.membership().inside_regions();
    assert_eq!(inside.len(), 1);
    assert_eq!(session.stats().enters, 2);
    assert_eq!(session.stats().exits, 1);
}

/// Cancellation stops the daemon even while senders are alive.
#[tokio::test]
async fn test_shutdown_via_cancellation() {
    let session = MonitoringSession::new(vec![region_a()], Arc::new(RecordingSink::default()));
    let (daemon, tx) = MonitorDaemon::new(session, 8);
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(daemon.run(shutdown.clone()));

    tx.send(at(region_a().center, 0)).await.unwrap();
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    shutdown.cancel();

    let session = tokio::time::timeout(StdDuration::from_secs(5), handle)
        .await
        .expect("daemon should stop after cancel")
        .unwrap();
    assert!(session.membership().is_inside("A"));
    drop(tx);
}
