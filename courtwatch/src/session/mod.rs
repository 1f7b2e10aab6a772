//! Monitoring session and its single-writer daemon.
//!
//! [`MonitoringSession`] ties the state machine to the notification gate and
//! a delivery sink. [`MonitorDaemon`] serializes sample producers through a
//! channel so the session always has exactly one writer.

mod daemon;
mod monitor;

pub use daemon::{MonitorDaemon, DEFAULT_SAMPLE_CHANNEL_CAPACITY};
pub use monitor::{MonitoringSession, NotificationOutcome, SampleOutcome, SessionStats};
