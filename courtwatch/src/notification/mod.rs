//! Notification gating and delivery.
//!
//! Transition events become notifications only when the region's cooldown
//! has elapsed ([`NotificationGate`]). Delivery goes through a
//! [`NotificationSink`]; the cooldown is recorded only after the sink
//! acknowledges, so a failed delivery can be retried on the next eligible
//! transition.

mod gate;
mod sink;

pub use gate::{is_eligible, CooldownState, NotificationGate, NOTIFICATION_COOLDOWN};
pub use sink::{DeliveryError, LogSink, Notification, NotificationSink};

use crate::geofence::{TransitionEvent, TransitionKind};

/// Build the notification text for a transition.
pub fn compose(event: &TransitionEvent) -> Notification {
    let (title, body) = match event.kind {
        TransitionKind::Enter => (
            format!("You're at {}", event.region_id),
            format!("You arrived at {}. Check in to let others know.", event.region_id),
        ),
        TransitionKind::Exit => (
            format!("Leaving {}", event.region_id),
            format!("You left {}. See you next time.", event.region_id),
        ),
    };

    Notification {
        region_id: event.region_id.clone(),
        title,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_compose_mentions_region() {
        let enter = compose(&TransitionEvent::enter("Marina Bay Court", Utc::now()));
        assert_eq!(enter.region_id, "Marina Bay Court");
        assert!(enter.title.contains("Marina Bay Court"));

        let exit = compose(&TransitionEvent::exit("VP Court", Utc::now()));
        assert!(exit.body.contains("VP Court"));
        assert_ne!(enter.title, exit.title);
    }
}
