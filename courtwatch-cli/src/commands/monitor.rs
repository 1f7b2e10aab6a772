//! `monitor` command.
//!
//! Streams JSON-lines position samples (one `{"latitude", "longitude",
//! "timestamp"}` object per line) from a file or stdin into a
//! [`MonitorDaemon`] and prints each transition as it happens.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::Args;
use console::style;
use courtwatch::catalog::{load_regions, parse_sample_line};
use courtwatch::config::ConfigFile;
use courtwatch::geofence::{PositionSample, Region, TransitionKind};
use courtwatch::session::{
    MonitorDaemon, MonitoringSession, NotificationOutcome, SampleOutcome, SessionStats,
    DEFAULT_SAMPLE_CHANNEL_CAPACITY,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::common::regions_path;
use crate::error::CliError;
use crate::sink::ConsoleSink;

/// Arguments for `courtwatch monitor`.
#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Region definitions (JSON); defaults to catalog.regions from config
    #[arg(long)]
    pub regions: Option<PathBuf>,

    /// JSON-lines sample file; reads stdin when omitted
    #[arg(long)]
    pub samples: Option<PathBuf>,

    /// Sample channel capacity
    #[arg(long, default_value_t = DEFAULT_SAMPLE_CHANNEL_CAPACITY)]
    pub queue: usize,
}

/// Run `courtwatch monitor`.
pub fn run(args: MonitorArgs, config: &ConfigFile) -> Result<(), CliError> {
    let regions = load_regions(&regions_path(args.regions, config)?)?;
    let queue = args.queue;

    let reader: Box<dyn BufRead + Send> = match &args.samples {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|e| {
            CliError::InvalidArgument(format!("cannot open {}: {}", path.display(), e))
        })?)),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    ctrlc::set_handler(move || {
        if ctrlc_token.is_cancelled() {
            // Second Ctrl-C while shutdown is still in progress
            std::process::exit(130);
        }
        ctrlc_token.cancel();
    })
    .map_err(|e| CliError::Runtime(format!("failed to install Ctrl-C handler: {}", e)))?;

    println!(
        "Monitoring {} region(s). Press Ctrl-C to stop.",
        regions.len()
    );

    let result = runtime.block_on(drive(regions, reader, queue, shutdown));
    // The sample reader may still be blocked on stdin; don't wait for it.
    runtime.shutdown_background();

    print_summary(&result?);
    Ok(())
}

/// Feed samples from `reader` through a daemon until the input ends or
/// `shutdown` fires.
async fn drive(
    regions: Vec<Region>,
    reader: Box<dyn BufRead + Send>,
    queue: usize,
    shutdown: CancellationToken,
) -> Result<SessionStats, CliError> {
    let session = MonitoringSession::new(regions, ConsoleSink);
    let (daemon, sample_tx) = MonitorDaemon::new(session, queue);
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

    let daemon_handle = tokio::spawn(daemon.with_subscriber(outcome_tx).run(shutdown.clone()));
    let printer = tokio::spawn(print_outcomes(outcome_rx));
    let producer = tokio::task::spawn_blocking(move || produce(reader, sample_tx));

    tokio::select! {
        joined = producer => {
            let skipped = joined
                .map_err(|e| CliError::Runtime(format!("sample reader failed: {}", e)))?;
            if skipped > 0 {
                tracing::warn!(skipped, "Skipped malformed sample lines");
            }
        }
        _ = shutdown.cancelled() => {
            tracing::info!("Shutdown requested, not waiting for remaining input");
        }
    }

    let session = daemon_handle
        .await
        .map_err(|e| CliError::Runtime(format!("monitor task failed: {}", e)))?;
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "Outcome printer failed");
    }

    Ok(session.stats())
}

/// Read samples line by line and queue them in order.
///
/// Returns the number of malformed lines skipped.
fn produce(reader: Box<dyn BufRead + Send>, tx: mpsc::Sender<PositionSample>) -> usize {
    let mut skipped = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read samples, stopping");
                break;
            }
        };

        match parse_sample_line(&line, idx + 1) {
            Ok(Some(sample)) => {
                if tx.blocking_send(sample).is_err() {
                    // Daemon stopped (shutdown requested)
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Skipping sample");
                skipped += 1;
            }
        }
    }

    skipped
}

async fn print_outcomes(mut rx: mpsc::UnboundedReceiver<SampleOutcome>) {
    while let Some(outcome) = rx.recv().await {
        for (event, notification) in &outcome.transitions {
            let kind = match event.kind {
                TransitionKind::Enter => style("ENTER").green().bold(),
                TransitionKind::Exit => style("EXIT ").red().bold(),
            };
            let note = match notification {
                NotificationOutcome::Delivered => String::new(),
                NotificationOutcome::Suppressed { remaining } => format!(
                    " {}",
                    style(format!(
                        "(notification suppressed, {}m{:02}s cooldown left)",
                        remaining.num_minutes(),
                        remaining.num_seconds() % 60
                    ))
                    .dim()
                ),
                NotificationOutcome::Failed { reason } => {
                    format!(" {}", style(format!("(notification failed: {})", reason)).yellow())
                }
            };
            println!(
                "{} {} {}{}",
                style(event.at.format("%Y-%m-%d %H:%M:%S")).dim(),
                kind,
                event.region_id,
                note
            );
        }
    }
}

fn print_summary(stats: &SessionStats) {
    println!();
    println!(
        "{} samples, {} enter(s), {} exit(s)",
        stats.samples, stats.enters, stats.exits
    );
    println!(
        "notifications: {} delivered, {} suppressed, {} failed",
        stats.delivered, stats.suppressed, stats.failed
    );
}
