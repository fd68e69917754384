use crate::types::DbId;

/// Domain errors shared by the store, worker and HTTP layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// User input rejected; the message is shown to the user as-is.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Stored data that violates a lifecycle invariant, or an unknown
    /// status value read back from the store.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `NotFound` for a weather request id.
    pub fn request_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "WeatherRequest",
            id,
        }
    }
}
