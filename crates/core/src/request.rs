//! Weather request lifecycle: status values, transitions, and input validation.
//!
//! A request moves `pending → processing → completed | failed` and never
//! leaves a terminal state. The persisted row stores the status as text; the
//! typed view of a row is [`RequestState`], which only carries result or
//! failure data in the states where that data exists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a location name, in characters.
pub const MAX_LOCATION_LEN: usize = 255;

/// Number of records shown in the recent-requests listing.
pub const RECENT_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a weather request, stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl RequestStatus {
    /// The text stored in the `status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
        }
    }

    /// `true` for `completed` and `failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Failed)
    }

    /// Whether a record in `self` may be moved to `next`.
    ///
    /// The only legal edges are `pending → processing` and
    /// `processing → completed | failed`. There is no retry edge.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Processing)
                | (RequestStatus::Processing, RequestStatus::Completed)
                | (RequestStatus::Processing, RequestStatus::Failed)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "processing" => Ok(RequestStatus::Processing),
            "completed" => Ok(RequestStatus::Completed),
            "failed" => Ok(RequestStatus::Failed),
            other => Err(CoreError::Internal(format!(
                "Unknown weather request status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// The columns written when a request completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResult {
    /// Provider payload, verbatim.
    pub raw_json: String,
    /// Pretty-printed `{location, summary, temperature, condition}` object.
    pub formatted_data: String,
    /// Display temperature such as `"20°C"`; absent when the provider had none.
    pub temperature: Option<String>,
    pub condition: String,
}

/// Typed view of a persisted request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RequestState {
    Pending,
    Processing,
    Completed(StoredResult),
    Failed { reason: String },
}

impl RequestState {
    pub fn status(&self) -> RequestStatus {
        match self {
            RequestState::Pending => RequestStatus::Pending,
            RequestState::Processing => RequestStatus::Processing,
            RequestState::Completed(_) => RequestStatus::Completed,
            RequestState::Failed { .. } => RequestStatus::Failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a user-supplied location and return it trimmed.
///
/// Rules:
/// - Must not be empty after trimming surrounding whitespace.
/// - Must not exceed [`MAX_LOCATION_LEN`] characters.
pub fn validate_location(location: &str) -> Result<String, CoreError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "The location field is required.".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_LOCATION_LEN {
        return Err(CoreError::Validation(format!(
            "The location must not be greater than {MAX_LOCATION_LEN} characters."
        )));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
