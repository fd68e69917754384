//! Weather request entity model and DTOs.

use serde::{Deserialize, Serialize};
use skyqueue_core::error::CoreError;
use skyqueue_core::request::{RequestState, RequestStatus, StoredResult};
use skyqueue_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `weather_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeatherRequest {
    pub id: DbId,
    pub location: String,
    pub status: String,
    pub raw_json: Option<String>,
    pub formatted_data: Option<String>,
    pub temperature: Option<String>,
    pub condition: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/weather-requests`.
#[derive(Debug, Deserialize)]
pub struct CreateWeatherRequest {
    #[serde(default)]
    pub location: String,
}

impl WeatherRequest {
    /// Parse the stored status text.
    pub fn status(&self) -> Result<RequestStatus, CoreError> {
        self.status.parse()
    }

    /// Project the flat row into its typed lifecycle state.
    ///
    /// A `completed` row missing its result columns is reported as an
    /// internal error rather than silently rendered as empty.
    pub fn state(&self) -> Result<RequestState, CoreError> {
        match self.status()? {
            RequestStatus::Pending => Ok(RequestState::Pending),
            RequestStatus::Processing => Ok(RequestState::Processing),
            RequestStatus::Failed => Ok(RequestState::Failed {
                reason: self
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Unknown error.".to_string()),
            }),
            RequestStatus::Completed => {
                match (&self.raw_json, &self.formatted_data, &self.condition) {
                    (Some(raw_json), Some(formatted_data), Some(condition)) => {
                        Ok(RequestState::Completed(StoredResult {
                            raw_json: raw_json.clone(),
                            formatted_data: formatted_data.clone(),
                            temperature: self.temperature.clone(),
                            condition: condition.clone(),
                        }))
                    }
                    _ => Err(CoreError::Internal(format!(
                        "Completed weather request {} is missing result columns",
                        self.id
                    ))),
                }
            }
        }
    }
}
