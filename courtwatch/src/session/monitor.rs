//! Session-scoped owner of membership and cooldown state.

use chrono::Duration;
use serde::Serialize;

use crate::geofence::{
    evaluate, MembershipState, PositionSample, Region, TransitionEvent, TransitionKind,
};
use crate::notification::{compose, NotificationGate, NotificationSink};

/// What happened to the notification for one transition.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    /// The sink acknowledged the notification; cooldown restarted.
    Delivered,
    /// The region is still cooling down.
    Suppressed {
        /// Time left until the region may notify again.
        remaining: Duration,
    },
    /// The sink failed; cooldown left untouched.
    Failed {
        /// Sink error message.
        reason: String,
    },
}

/// Result of processing one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    /// The processed sample.
    pub sample: PositionSample,
    /// Transitions, each paired with its notification outcome.
    pub transitions: Vec<(TransitionEvent, NotificationOutcome)>,
}

impl SampleOutcome {
    /// The transition events alone.
    pub fn events(&self) -> impl Iterator<Item = &TransitionEvent> {
        self.transitions.iter().map(|(event, _)| event)
    }

    /// Number of notifications the sink acknowledged.
    pub fn delivered(&self) -> usize {
        self.transitions
            .iter()
            .filter(|(_, o)| *o == NotificationOutcome::Delivered)
            .count()
    }
}

/// Running totals for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Samples evaluated.
    pub samples: u64,
    /// Enter transitions.
    pub enters: u64,
    /// Exit transitions.
    pub exits: u64,
    /// Notifications the sink acknowledged.
    pub delivered: u64,
    /// Notifications held back by the cooldown.
    pub suppressed: u64,
    /// Notifications the sink failed to deliver.
    pub failed: u64,
}

/// A single user's monitoring session.
///
/// Owns the configured regions, the [`MembershipState`], the
/// [`NotificationGate`] and the delivery sink. Samples must be fed in arrival
/// order through `&mut self`, which gives the state a single writer; see
/// [`super::MonitorDaemon`] for the channel front end.
pub struct MonitoringSession<S> {
    regions: Vec<Region>,
    membership: MembershipState,
    gate: NotificationGate,
    sink: S,
    stats: SessionStats,
}

impl<S> std::fmt::Debug for MonitoringSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoringSession")
            .field("regions", &self.regions.len())
            .field("membership", &self.membership)
            .field("gate", &self.gate)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: NotificationSink> MonitoringSession<S> {
    /// Start a session with every region outside and no notification history.
    pub fn new(regions: Vec<Region>, sink: S) -> Self {
        let membership = MembershipState::for_regions(&regions);
        Self {
            regions,
            membership,
            gate: NotificationGate::new(),
            sink,
            stats: SessionStats::default(),
        }
    }

    /// Run the state machine for one sample without notifying.
    pub fn on_sample(&mut self, sample: &PositionSample) -> Vec<TransitionEvent> {
        self.stats.samples += 1;
        let events = evaluate(&mut self.membership, &self.regions, sample);
        for event in &events {
            match event.kind {
                TransitionKind::Enter => self.stats.enters += 1,
                TransitionKind::Exit => self.stats.exits += 1,
            }
        }
        events
    }

    /// Run the state machine for one sample and notify eligible transitions.
    ///
    /// Eligibility is judged at the sample's timestamp. The cooldown is
    /// recorded only when the sink acknowledges delivery.
    pub async fn handle_sample(&mut self, sample: PositionSample) -> SampleOutcome {
        let events = self.on_sample(&sample);
        let mut transitions = Vec::with_capacity(events.len());

        for event in events {
            let outcome = self.notify(&event).await;
            transitions.push((event, outcome));
        }

        SampleOutcome {
            sample,
            transitions,
        }
    }

    async fn notify(&mut self, event: &TransitionEvent) -> NotificationOutcome {
        let now = event.at;

        if !self.gate.is_eligible(&event.region_id, now) {
            let remaining = self
                .gate
                .remaining(&event.region_id, now)
                .unwrap_or_else(Duration::zero);
            self.stats.suppressed += 1;
            tracing::debug!(
                region_id = %event.region_id,
                kind = %event.kind,
                remaining_secs = remaining.num_seconds(),
                "Notification suppressed by cooldown"
            );
            return NotificationOutcome::Suppressed { remaining };
        }

        let notification = compose(event);
        match self.sink.deliver(&notification).await {
            Ok(()) => {
                self.gate.record_notified(&event.region_id, now);
                self.stats.delivered += 1;
                tracing::info!(
                    region_id = %event.region_id,
                    kind = %event.kind,
                    "Notification delivered"
                );
                NotificationOutcome::Delivered
            }
            Err(e) => {
                self.stats.failed += 1;
                tracing::warn!(
                    region_id = %event.region_id,
                    kind = %event.kind,
                    error = %e,
                    "Notification delivery failed, cooldown unchanged"
                );
                NotificationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Configured regions.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Current membership state.
    pub fn membership(&self) -> &MembershipState {
        &self.membership
    }

    /// Notification gate and its cooldown state.
    pub fn gate(&self) -> &NotificationGate {
        &self.gate
    }

    /// Running totals.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// The delivery sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{offset_north, GeoPoint};
    use crate::notification::{DeliveryError, Notification};
    use chrono::{DateTime, Utc};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FlakySink {
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl NotificationSink for FlakySink {
        fn deliver<'a>(
            &'a self,
            _notification: &'a Notification,
        ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.fail.load(Ordering::SeqCst) {
                    Err(DeliveryError::Unavailable("offline".to_string()))
                } else {
                    Ok(())
                }
            })
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn center() -> GeoPoint {
        GeoPoint::new(1.0, 1.0)
    }

    fn sample(point: GeoPoint, minutes: i64) -> PositionSample {
        PositionSample::with_timestamp(
            point.latitude,
            point.longitude,
            t0() + Duration::minutes(minutes),
        )
    }

    fn session() -> MonitoringSession<FlakySink> {
        MonitoringSession::new(
            vec![Region::new("A", center(), 100.0)],
            FlakySink::default(),
        )
    }

    #[tokio::test]
    async fn test_enter_is_delivered_then_suppressed() {
        let mut s = session();
        let far = offset_north(center(), 1.0);

        let first = s.handle_sample(sample(center(), 0)).await;
        assert_eq!(first.delivered(), 1);

        let exit = s.handle_sample(sample(far, 1)).await;
        assert!(matches!(
            exit.transitions[0].1,
            NotificationOutcome::Suppressed { remaining } if remaining == Duration::minutes(14)
        ));

        // Membership still tracks truth even while suppressed
        assert!(!s.membership().is_inside("A"));

        let again = s.handle_sample(sample(center(), 16)).await;
        assert_eq!(again.delivered(), 1);
        assert_eq!(
            s.stats(),
            SessionStats {
                samples: 3,
                enters: 2,
                exits: 1,
                delivered: 2,
                suppressed: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_failed_delivery_leaves_cooldown_untouched() {
        let mut s = session();
        let far = offset_north(center(), 1.0);
        s.sink().fail.store(true, Ordering::SeqCst);

        let outcome = s.handle_sample(sample(center(), 0)).await;
        assert!(matches!(outcome.transitions[0].1, NotificationOutcome::Failed { .. }));
        assert_eq!(s.gate().state().last_notified_at("A"), None);
        assert!(s.membership().is_inside("A"));

        // Next transition is eligible again and succeeds once the sink recovers
        s.sink().fail.store(false, Ordering::SeqCst);
        let outcome = s.handle_sample(sample(far, 1)).await;
        assert_eq!(outcome.transitions[0].1, NotificationOutcome::Delivered);
        assert_eq!(
            s.gate().state().last_notified_at("A"),
            Some(t0() + Duration::minutes(1))
        );
        assert_eq!(s.sink().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_sample_without_transition_does_not_notify() {
        let mut s = session();
        let far = offset_north(center(), 1.0);

        let outcome = s.handle_sample(sample(far, 0)).await;

        assert!(outcome.transitions.is_empty());
        assert_eq!(s.sink().calls.load(Ordering::SeqCst), 0);
        assert_eq!(s.stats().samples, 1);
    }

    #[test]
    fn test_on_sample_replay_is_noop() {
        let mut s = session();
        let sample = sample(center(), 0);
        assert_eq!(s.on_sample(&sample).len(), 1);
        assert!(s.on_sample(&sample).is_empty());
        assert_eq!(s.stats().enters, 1);
    }
}
