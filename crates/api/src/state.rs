use std::sync::Arc;

use skyqueue_db::store::RequestStore;
use skyqueue_worker::queue::JobQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Weather request persistence (Postgres or in-memory).
    pub store: Arc<dyn RequestStore>,
    /// Hands new requests to the dispatcher.
    pub queue: JobQueue,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
