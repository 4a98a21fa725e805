use anyhow::Result;
use std::time::Duration;
use voyage_api::run as run_api;
use voyage_core::{Config, TravelContext};
use voyage_notify::ReminderScheduler;
use tokio;
use tracing;
use tracing_subscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before the filter reads RUST_LOG
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Voyage travel backend");

    let config = Config::from_env();
    let ctx = TravelContext::new(config).await?;

    tracing::info!("Travel context initialized ({:?} store)", ctx.config.store.backend);

    let reminders = &ctx.config.reminders;
    if reminders.enabled {
        let interval = Duration::from_secs(reminders.interval_secs.max(1));
        let scheduler = ReminderScheduler::new(ctx.clone());
        tokio::spawn(scheduler.run(interval));
    } else {
        tracing::info!("Reminder scheduler disabled");
    }

    tokio::select! {
        result = run_api(ctx) => {
            if let Err(e) = result {
                tracing::error!("API server error: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
