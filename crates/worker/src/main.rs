use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use skyqueue_db::store::{PgRequestStore, RequestStore};
use skyqueue_weather::WeatherConfig;
use skyqueue_worker::config::WorkerConfig;
use skyqueue_worker::processor::RequestProcessor;
use skyqueue_worker::queue::{Dispatcher, JobQueue};
use skyqueue_worker::{poller, shutdown};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyqueue_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    let weather_config = WeatherConfig::from_env();
    tracing::info!(?config, ?weather_config, "Loaded worker configuration");

    // --- Database ---
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set for the worker")?;
    let pool = skyqueue_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    skyqueue_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    let store: Arc<dyn RequestStore> = Arc::new(PgRequestStore::new(pool));

    // --- Processing ---
    let source = skyqueue_weather::build_source(&weather_config)
        .context("Failed to build weather source")?;
    let processor = Arc::new(RequestProcessor::new(Arc::clone(&store), source));

    let (queue, receiver) = JobQueue::channel();
    let cancel = CancellationToken::new();

    let dispatcher = Dispatcher::new(processor, config.concurrency);
    let dispatcher_handle = tokio::spawn(dispatcher.run(receiver, cancel.clone()));

    let poller_handle = tokio::spawn(poller::run(
        store,
        queue,
        Duration::from_secs(config.poll_interval_secs.max(1)),
        cancel.clone(),
    ));

    shutdown::shutdown_signal().await;

    // --- Shutdown ---
    cancel.cancel();
    let _ = poller_handle.await;
    if tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        dispatcher_handle,
    )
    .await
    .is_err()
    {
        tracing::warn!("Timed out waiting for in-flight weather requests");
    }

    tracing::info!("Worker stopped");
    Ok(())
}
