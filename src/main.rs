use std::time::Duration;

use anyhow::Context;
use stripe_moneybird_sync::config::Config;
use stripe_moneybird_sync::sync::{SyncJob, SyncReport};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the sync job.
///
/// Initializes tracing, loads configuration and runs either a single sync
/// pass or, when `SYNC_INTERVAL_SECS` is set, one pass per interval until
/// Ctrl-C. Configuration errors and a failed one-shot pass end the process
/// with a non-zero exit code.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stripe_moneybird_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let interval = config.sync_interval;

    let job = SyncJob::from_config(config).context("Failed to initialize sync job")?;

    match interval {
        None => {
            run_once(&job).await?;
        }
        Some(every) => run_periodically(&job, every).await,
    }

    Ok(())
}

async fn run_once(job: &SyncJob) -> anyhow::Result<SyncReport> {
    let report = job.run().await.map_err(|e| {
        tracing::error!("Error in sync run: {}", e);
        anyhow::Error::new(e)
    })?;

    if report.fetched > 0 {
        tracing::info!("Sync run completed.");
    }
    Ok(report)
}

async fn run_periodically(job: &SyncJob, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // A pass that overruns the interval delays the next one instead of bursting.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("Running sync every {}s, Ctrl-C to stop", every.as_secs());
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Already logged; the next tick retries from the stored cursor.
                let _ = run_once(job).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested, stopping");
                break;
            }
        }
    }
}
