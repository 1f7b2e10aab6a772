//! Delivery sink abstraction.
//!
//! The sink is the boundary to whatever actually shows a notification to the
//! user (push service, terminal, test recorder). It reports success or
//! failure; transport and retry policy belong to the implementation.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Region the notification is about.
    pub region_id: String,
    /// Short headline.
    pub title: String,
    /// Body text.
    pub body: String,
}

/// Errors reported by a delivery sink.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The sink is temporarily unable to deliver.
    #[error("delivery sink unavailable: {0}")]
    Unavailable(String),

    /// I/O error while writing the notification.
    #[error("delivery I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives notifications that passed the cooldown gate.
///
/// Uses a boxed future so the trait stays dyn-compatible.
pub trait NotificationSink: Send + Sync + 'static {
    /// Deliver a notification. `Ok(())` acknowledges delivery.
    fn deliver<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>>;
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn deliver<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        (**self).deliver(notification)
    }
}

/// Sink that writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(
                region_id = %notification.region_id,
                title = %notification.title,
                "{}",
                notification.body
            );
            Ok(())
        })
    }
}
