//! graceful-closer service runner
//!
//! Runs a heartbeat worker until SIGINT/SIGTERM, then shuts it down through
//! the closer.
//!
//! # Architecture Overview
//!
//! ```text
//!   --config file.toml ─┐
//!   environment ────────┴─▶ ServiceConfig ─▶ logging::init
//!                                   │
//!                                   ▼
//!   SIGINT/SIGTERM ──────▶ ┌──────────────┐      ┌──────────────────┐
//!   CancellationToken ───▶ │    Closer    │ ───▶ │ shutdown actions │
//!                          └──────┬───────┘      │  (concurrently)  │
//!                                 │              └──────────────────┘
//!                                 ▼
//!                      completion (graceful | timed out)
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use graceful_closer::config::load_config;
use graceful_closer::observability::correlation::{self, CorrelationId};
use graceful_closer::observability::logging;
use graceful_closer::Closer;

#[derive(Parser)]
#[command(name = "graceful-closer")]
#[command(about = "Service runner with graceful shutdown", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Heartbeat interval in seconds.
    #[arg(long, default_value_t = 1)]
    heartbeat_secs: u64,
}

/// How long teardown waits for blocking shutdown procedures still running
/// after the closer has completed.
const RUNTIME_TEARDOWN: Duration = Duration::from_millis(500);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run(cli));

    // A plain drop would block on procedures that outlived the grace period.
    runtime.shutdown_timeout(RUNTIME_TEARDOWN);
    result
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;
    logging::init(&config)?;

    tracing::info!(
        service_name = %config.service_name,
        service_version = %config.service_version,
        mode = %config.mode,
        log_level = %config.log_level,
        "graceful-closer starting"
    );

    let root = CancellationToken::new();
    let closer = Closer::new(root.clone(), config.closer_graceful_timeout.clone());

    tracing::info!(
        grace_period_secs = closer.grace_period().as_secs_f64(),
        "Closer ready, waiting for SIGINT/SIGTERM"
    );

    let stop = CancellationToken::new();
    let worker = tokio::spawn(correlation::scope(
        CorrelationId::generate(),
        heartbeat(stop.clone(), Duration::from_secs(cli.heartbeat_secs.max(1))),
    ));

    closer.add_action(move || stop.cancel());
    closer.add_task(async move {
        match worker.await {
            Ok(beats) => tracing::info!(beats, "heartbeat worker drained"),
            Err(e) => tracing::error!(error = %e, "heartbeat worker failed"),
        }
    });

    closer.wait().await;

    tracing::info!(outcome = ?closer.completion().outcome(), "Shutdown complete");
    Ok(())
}

/// Log a heartbeat every `interval` until `stop` is cancelled.
async fn heartbeat(stop: CancellationToken, interval: Duration) -> u64 {
    let mut ticker = tokio::time::interval(interval);
    let mut beats = 0;

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                beats += 1;
                tracing::debug!(
                    beats,
                    cid = ?correlation::current().map(|cid| cid.to_string()),
                    "heartbeat"
                );
            }
        }
    }

    beats
}
