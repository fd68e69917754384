//! Browser-facing pages, mounted at the root.

use axum::routing::get;
use axum::Router;

use crate::handlers::pages;
use crate::state::AppState;

/// ```text
/// GET  /               -> redirect to /weather
/// GET  /weather        -> index
/// POST /weather        -> store
/// GET  /weather/{id}   -> show
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::root))
        .route("/weather", get(pages::index).post(pages::store))
        .route("/weather/{id}", get(pages::show))
}
