//! Cooldown gate for region notifications.
//!
//! The gate only answers "may this region notify now?" and remembers when a
//! region last notified. It never dispatches anything itself, and it is kept
//! apart from [`crate::geofence::MembershipState`] so suppressing a
//! notification can never change whether the user is recorded as inside.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Minimum time between two notifications for the same region.
pub const NOTIFICATION_COOLDOWN: Duration = Duration::minutes(15);

/// Returns true if `region_id`, last notified at `last_notified_at`, may
/// notify again at `now`.
///
/// A region that has never notified is always eligible. If the clock moved
/// backwards the elapsed time is negative and the region stays suppressed.
pub fn is_eligible(
    region_id: &str,
    last_notified_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let eligible = match last_notified_at {
        None => true,
        Some(last) => now - last >= NOTIFICATION_COOLDOWN,
    };
    tracing::trace!(region_id, eligible, "Cooldown check");
    eligible
}

/// Last-notified timestamps, keyed by region id.
#[derive(Debug, Clone, Default)]
pub struct CooldownState {
    last_notified: HashMap<String, DateTime<Utc>>,
}

impl CooldownState {
    /// Create an empty cooldown state.
    pub fn new() -> Self {
        Self::default()
    }

    /// When `region_id` last notified successfully.
    pub fn last_notified_at(&self, region_id: &str) -> Option<DateTime<Utc>> {
        self.last_notified.get(region_id).copied()
    }

    /// Number of regions that have notified at least once.
    pub fn len(&self) -> usize {
        self.last_notified.len()
    }

    /// Returns true if no region has notified yet.
    pub fn is_empty(&self) -> bool {
        self.last_notified.is_empty()
    }
}

/// Per-region notification rate limiter.
///
/// # Usage
///
/// ```
/// use chrono::Utc;
/// use courtwatch::notification::NotificationGate;
///
/// let mut gate = NotificationGate::new();
/// let now = Utc::now();
///
/// if gate.is_eligible("court-1", now) {
///     // dispatch, then on success:
///     gate.record_notified("court-1", now);
/// }
/// assert!(!gate.is_eligible("court-1", now));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NotificationGate {
    state: CooldownState,
}

impl NotificationGate {
    /// Create a gate with no notification history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate from existing cooldown state.
    pub fn with_state(state: CooldownState) -> Self {
        Self { state }
    }

    /// Returns true if `region_id` may notify at `now`.
    pub fn is_eligible(&self, region_id: &str, now: DateTime<Utc>) -> bool {
        is_eligible(region_id, self.state.last_notified_at(region_id), now)
    }

    /// Record a successful notification for `region_id`.
    ///
    /// Call only after the delivery sink acknowledged the notification.
    pub fn record_notified(&mut self, region_id: &str, now: DateTime<Utc>) {
        self.state.last_notified.insert(region_id.to_string(), now);
    }

    /// Time left until `region_id` becomes eligible, or `None` if it already is.
    pub fn remaining(&self, region_id: &str, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.state.last_notified_at(region_id)?;
        let remaining = NOTIFICATION_COOLDOWN - (now - last);
        (remaining > Duration::zero()).then_some(remaining)
    }

    /// Cooldown state backing this gate.
    pub fn state(&self) -> &CooldownState {
        &self.state
    }
}
