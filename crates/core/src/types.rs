//! Shared scalar aliases.

/// Weather request id (`weather_requests.id`, BIGSERIAL).
pub type DbId = i64;

/// `created_at` / `updated_at`, always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
