use axum::routing::get;
use axum::Router;

use crate::handlers::weather_requests;
use crate::state::AppState;

/// Weather request routes mounted at `/api/v1/weather-requests`.
///
/// ```text
/// GET  /       -> list_weather_requests
/// POST /       -> create_weather_request
/// GET  /{id}   -> get_weather_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(weather_requests::list_weather_requests)
                .post(weather_requests::create_weather_request),
        )
        .route("/{id}", get(weather_requests::get_weather_request))
}
