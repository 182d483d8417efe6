//! # Tickler — reminder worker daemon
//!
//! Runs the single background worker that polls for due reminders and
//! dispatches notifications. The HTTP API and UI live elsewhere; this
//! binary only hosts the scheduling loop.
//!
//! Usage:
//!   tickler                          # default config (~/.tickler/config.toml)
//!   tickler --interval 5 --verbose   # faster polling, debug logs

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use tickler_core::clock::RefZone;
use tickler_core::config::TicklerConfig;
use tickler_scheduler::{Dispatcher, ReminderWorker};
use tickler_store::SqliteStore;

#[derive(Parser)]
#[command(name = "tickler", version, about = "⏰ Tickler — background reminder worker")]
struct Cli {
    /// Config file path (default: ~/.tickler/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database path (default: ~/.tickler/tickler.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Override the poll interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => TicklerConfig::load_from(path)?,
        None => TicklerConfig::load()?,
    };

    let zone = RefZone::parse(&config.scheduler.reference_offset)?;
    let db_path = cli
        .db
        .unwrap_or_else(|| TicklerConfig::home_dir().join("tickler.db"));
    let store = Arc::new(SqliteStore::open(&db_path, zone)?);

    let dispatcher = Arc::new(Dispatcher::from_config(&config.channel));
    let interval = cli.interval.unwrap_or(config.scheduler.check_interval_secs);

    let worker = ReminderWorker::new(store, dispatcher, zone, interval);
    let Some(handle) = worker.spawn() else {
        anyhow::bail!("reminder worker already running");
    };

    tracing::info!(
        "Tickler worker running (db: {}). Press Ctrl+C to stop.",
        db_path.display()
    );
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");
    handle.stop().await;
    Ok(())
}
