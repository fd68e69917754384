pub mod health;
pub mod weather;
pub mod weather_requests;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /weather-requests          list, create
/// /weather-requests/{id}     get
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/weather-requests", weather_requests::router())
}
