//! Channel front end for a monitoring session.
//!
//! Location callbacks (foreground and background alike) send
//! [`PositionSample`]s into one bounded channel. A single [`MonitorDaemon`]
//! task drains it and is the only writer of the session state, so samples
//! are evaluated strictly in the order they were queued.
//!
//! ```text
//!  foreground ──┐
//!               ├──► mpsc::Sender<PositionSample> ──► MonitorDaemon ──► SampleOutcome
//!  background ──┘                                   (owns session)     subscriber
//! ```
//!
//! # Example
//!
//! ```ignore
//! use courtwatch::session::{MonitorDaemon, MonitoringSession};
//! use courtwatch::notification::LogSink;
//!
//! let session = MonitoringSession::new(regions, LogSink);
//! let (daemon, sample_tx) = MonitorDaemon::new(session, 256);
//!
//! let shutdown = CancellationToken::new();
//! let handle = tokio::spawn(daemon.run(shutdown.clone()));
//!
//! sample_tx.send(PositionSample::new(1.0, 1.0)).await?;
//! drop(sample_tx);
//! let session = handle.await?;
//! ```

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::monitor::{MonitoringSession, SampleOutcome};
use crate::geofence::PositionSample;
use crate::notification::NotificationSink;

/// Default capacity of the sample channel.
pub const DEFAULT_SAMPLE_CHANNEL_CAPACITY: usize = 256;

/// Single consumer of position samples for one session.
pub struct MonitorDaemon<S> {
    session: MonitoringSession<S>,
    sample_rx: mpsc::Receiver<PositionSample>,
    outcome_tx: Option<mpsc::UnboundedSender<SampleOutcome>>,
}

impl<S: NotificationSink> MonitorDaemon<S> {
    /// Creates a daemon and the sender producers use to submit samples.
    ///
    /// The sender can be cloned for multiple producers; ordering across
    /// producers is the order in which their sends complete.
    pub fn new(
        session: MonitoringSession<S>,
        channel_capacity: usize,
    ) -> (Self, mpsc::Sender<PositionSample>) {
        let (sample_tx, sample_rx) = mpsc::channel(channel_capacity.max(1));
        let daemon = Self {
            session,
            sample_rx,
            outcome_tx: None,
        };
        (daemon, sample_tx)
    }

    /// Forward every [`SampleOutcome`] to `tx`.
    pub fn with_subscriber(mut self, tx: mpsc::UnboundedSender<SampleOutcome>) -> Self {
        self.outcome_tx = Some(tx);
        self
    }

    /// Process samples until every sender is dropped or `shutdown` fires.
    ///
    /// Returns the session so callers can inspect its final state. Samples
    /// still queued when shutdown fires are not processed.
    pub async fn run(self, shutdown: CancellationToken) -> MonitoringSession<S> {
        let Self {
            mut session,
            mut sample_rx,
            mut outcome_tx,
        } = self;

        info!(regions = session.regions().len(), "Monitor daemon starting");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Monitor daemon shutting down");
                    break;
                }

                maybe_sample = sample_rx.recv() => {
                    let Some(sample) = maybe_sample else {
                        debug!("Sample channel closed");
                        break;
                    };

                    let outcome = session.handle_sample(sample).await;

                    if let Some(tx) = &outcome_tx {
                        if tx.send(outcome).is_err() {
                            debug!("Outcome subscriber dropped");
                            outcome_tx = None;
                        }
                    }
                }
            }
        }

        let stats = session.stats();
        info!(
            samples = stats.samples,
            enters = stats.enters,
            exits = stats.exits,
            delivered = stats.delivered,
            suppressed = stats.suppressed,
            failed = stats.failed,
            "Monitor daemon stopped"
        );

        session
    }
}
