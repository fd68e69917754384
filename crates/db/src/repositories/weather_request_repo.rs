//! Repository for the `weather_requests` table.
//!
//! Every status change is a conditional update keyed on the current status,
//! so the table itself enforces `pending → processing → completed | failed`.

use skyqueue_core::request::{RequestStatus, StoredResult};
use skyqueue_core::types::DbId;
use sqlx::PgPool;

use crate::models::weather_request::WeatherRequest;

/// Column list for `weather_requests` queries.
const COLUMNS: &str = "\
    id, location, status, raw_json, formatted_data, temperature, condition, \
    error_message, created_at, updated_at";

/// Maximum page size for listings.
const MAX_LIMIT: i64 = 100;

/// Clamp a caller-supplied limit into `1..=MAX_LIMIT`.
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LIMIT)
}

/// Provides CRUD and lifecycle operations for weather requests.
pub struct WeatherRequestRepo;

impl WeatherRequestRepo {
    /// Insert a new `pending` request.
    pub async fn create(pool: &PgPool, location: &str) -> Result<WeatherRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO weather_requests (location, status) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WeatherRequest>(&query)
            .bind(location)
            .bind(RequestStatus::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a request by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WeatherRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM weather_requests WHERE id = $1");
        sqlx::query_as::<_, WeatherRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recently created requests first.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<WeatherRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM weather_requests \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1"
        );
        sqlx::query_as::<_, WeatherRequest>(&query)
            .bind(clamp_limit(limit))
            .fetch_all(pool)
            .await
    }

    /// IDs of requests still waiting to be processed, oldest first.
    pub async fn list_pending_ids(pool: &PgPool, limit: i64) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM weather_requests \
             WHERE status = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT $2",
        )
        .bind(RequestStatus::Pending.as_str())
        .bind(clamp_limit(limit))
        .fetch_all(pool)
        .await
    }

    /// Claim a pending request for processing.
    ///
    /// Moves the row to `processing` and clears `error_message`, but only if
    /// it is still `pending`. Returns `None` when the row does not exist or
    /// another task already claimed it, so a duplicate dispatch of the same
    /// ID processes at most once.
    pub async fn claim(pool: &PgPool, id: DbId) -> Result<Option<WeatherRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE weather_requests \
             SET status = $2, error_message = NULL, updated_at = NOW() \
             WHERE id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WeatherRequest>(&query)
            .bind(id)
            .bind(RequestStatus::Processing.as_str())
            .bind(RequestStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Store a successful result and mark the request `completed`.
    ///
    /// Returns `false` if the request was not in `processing`.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        result: &StoredResult,
    ) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE weather_requests \
             SET status = $2, raw_json = $3, formatted_data = $4, \
                 temperature = $5, condition = $6, updated_at = NOW() \
             WHERE id = $1 AND status = $7",
        )
        .bind(id)
        .bind(RequestStatus::Completed.as_str())
        .bind(&result.raw_json)
        .bind(&result.formatted_data)
        .bind(&result.temperature)
        .bind(&result.condition)
        .bind(RequestStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }

    /// Mark the request `failed` with a diagnostic message.
    ///
    /// Result columns are left untouched. Returns `false` if the request was
    /// not in `processing`.
    pub async fn fail(pool: &PgPool, id: DbId, message: &str) -> Result<bool, sqlx::Error> {
        let outcome = sqlx::query(
            "UPDATE weather_requests \
             SET status = $2, error_message = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(RequestStatus::Failed.as_str())
        .bind(message)
        .bind(RequestStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(-5), 1);
        assert_eq!(clamp_limit(10), 10);
        assert_eq!(clamp_limit(500), MAX_LIMIT);
    }
}
