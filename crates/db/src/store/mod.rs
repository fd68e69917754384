//! The record store seam.
//!
//! The worker and API hold an `Arc<dyn RequestStore>` so the same code runs
//! against Postgres in production and against [`MemoryRequestStore`] in tests
//! or when no `DATABASE_URL` is configured.

use async_trait::async_trait;
use skyqueue_core::request::StoredResult;
use skyqueue_core::types::DbId;

use crate::models::weather_request::WeatherRequest;
use crate::repositories::WeatherRequestRepo;
use crate::DbPool;

pub mod memory;

pub use memory::MemoryRequestStore;

/// Persistence operations for weather requests.
///
/// Lifecycle writes are conditional: [`claim`](Self::claim) only succeeds on
/// a `pending` record, [`complete`](Self::complete) and [`fail`](Self::fail)
/// only on a `processing` one.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Insert a new `pending` request.
    async fn create(&self, location: &str) -> Result<WeatherRequest, sqlx::Error>;

    async fn find_by_id(&self, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error>;

    /// Most recently created first, at most `limit` rows.
    async fn list_recent(&self, limit: i64) -> Result<Vec<WeatherRequest>, sqlx::Error>;

    /// IDs still `pending`, oldest first.
    async fn list_pending_ids(&self, limit: i64) -> Result<Vec<DbId>, sqlx::Error>;

    /// Exclusive `pending → processing` claim. `None` if not claimable.
    async fn claim(&self, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error>;

    /// `processing → completed`, writing the result columns.
    async fn complete(&self, id: DbId, result: &StoredResult) -> Result<bool, sqlx::Error>;

    /// `processing → failed`, writing `error_message` only.
    async fn fail(&self, id: DbId, message: &str) -> Result<bool, sqlx::Error>;

    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> Result<(), sqlx::Error>;
}

/// [`RequestStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgRequestStore {
    pool: DbPool,
}

impl PgRequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestStore for PgRequestStore {
    async fn create(&self, location: &str) -> Result<WeatherRequest, sqlx::Error> {
        WeatherRequestRepo::create(&self.pool, location).await
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error> {
        WeatherRequestRepo::find_by_id(&self.pool, id).await
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<WeatherRequest>, sqlx::Error> {
        WeatherRequestRepo::list_recent(&self.pool, limit).await
    }

    async fn list_pending_ids(&self, limit: i64) -> Result<Vec<DbId>, sqlx::Error> {
        WeatherRequestRepo::list_pending_ids(&self.pool, limit).await
    }

    async fn claim(&self, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error> {
        WeatherRequestRepo::claim(&self.pool, id).await
    }

    async fn complete(&self, id: DbId, result: &StoredResult) -> Result<bool, sqlx::Error> {
        WeatherRequestRepo::complete(&self.pool, id, result).await
    }

    async fn fail(&self, id: DbId, message: &str) -> Result<bool, sqlx::Error> {
        WeatherRequestRepo::fail(&self.pool, id, message).await
    }

    async fn health_check(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }
}
