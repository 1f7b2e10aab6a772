//! Terminal notification sink.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use console::style;
use courtwatch::notification::{DeliveryError, Notification, NotificationSink};

/// Prints notifications to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn deliver<'a>(
        &'a self,
        notification: &'a Notification,
    ) -> Pin<Box<dyn Future<Output = Result<(), DeliveryError>> + Send + 'a>> {
        Box::pin(async move {
            print_notification(notification)?;
            Ok(())
        })
    }
}

fn print_notification(notification: &Notification) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(
        out,
        "  {} {}: {}",
        style("🔔").yellow(),
        style(&notification.title).bold(),
        notification.body
    )?;
    out.flush()
}
