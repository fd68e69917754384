//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?limit=` for listing endpoints. Clamped in the repository layer via
/// `clamp_limit`.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

/// `?queued=1` appended by the redirect after a form submission.
#[derive(Debug, Default, Deserialize)]
pub struct ShowParams {
    pub queued: Option<String>,
}

impl ShowParams {
    pub fn is_queued(&self) -> bool {
        matches!(self.queued.as_deref(), Some(v) if !v.is_empty() && v != "0")
    }
}
