use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use skyqueue_db::store::{MemoryRequestStore, PgRequestStore, RequestStore};
use skyqueue_weather::WeatherConfig;
use skyqueue_worker::config::WorkerConfig;
use skyqueue_worker::processor::RequestProcessor;
use skyqueue_worker::queue::{recover_pending, Dispatcher, JobQueue};
use skyqueue_worker::shutdown::shutdown_signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyqueue_api::config::ServerConfig;
use skyqueue_api::router::build_app_router;
use skyqueue_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "skyqueue_api=debug,skyqueue_worker=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let worker_config = WorkerConfig::from_env();
    let weather_config = WeatherConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(?worker_config, ?weather_config, "Loaded processing configuration");

    // --- Store ---
    let store: Arc<dyn RequestStore> = match &config.database_url {
        Some(database_url) => {
            let pool = skyqueue_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            skyqueue_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            skyqueue_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgRequestStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (records are lost on exit)");
            Arc::new(MemoryRequestStore::new())
        }
    };

    // --- Processing ---
    let cancel = CancellationToken::new();
    let (queue, dispatcher_handle) = if config.embedded_worker {
        let source =
            skyqueue_weather::build_source(&weather_config).expect("Failed to build weather source");
        let processor = Arc::new(RequestProcessor::new(Arc::clone(&store), source));
        let (queue, receiver) = JobQueue::channel();
        let dispatcher = Dispatcher::new(processor, worker_config.concurrency);
        let handle = tokio::spawn(dispatcher.run(receiver, cancel.clone()));

        match recover_pending(store.as_ref(), &queue).await {
            Ok(0) => {}
            Ok(recovered) => tracing::info!(recovered, "Re-enqueued pending weather requests"),
            Err(e) => tracing::error!(error = %e, "Failed to recover pending weather requests"),
        }

        (queue, Some(handle))
    } else {
        tracing::info!("Embedded worker disabled, processing deferred to skyqueue-worker");
        (JobQueue::external(), None)
    };

    // --- App state ---
    let state = AppState {
        store,
        queue,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    if let Some(handle) = dispatcher_handle {
        if tokio::time::timeout(
            Duration::from_secs(worker_config.shutdown_timeout_secs),
            handle,
        )
        .await
        .is_err()
        {
            tracing::warn!("Timed out waiting for in-flight weather requests");
        }
    }

    tracing::info!("Graceful shutdown complete");
}
