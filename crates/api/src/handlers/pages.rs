//! HTML handlers for the `/weather` pages.

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use skyqueue_core::error::CoreError;
use skyqueue_core::request::RECENT_LIMIT;
use skyqueue_core::types::DbId;
use skyqueue_db::models::weather_request::CreateWeatherRequest;

use crate::error::{AppError, PageResult};
use crate::handlers::weather_requests::{find_or_404, submit};
use crate::query::ShowParams;
use crate::state::AppState;
use crate::views::{self, FormState};

/// GET /
pub async fn root() -> Redirect {
    Redirect::to("/weather")
}

/// GET /weather
pub async fn index(State(state): State<AppState>) -> PageResult<Html<String>> {
    let recent = state.store.list_recent(RECENT_LIMIT).await?;
    Ok(Html(views::index_page(&recent, &FormState::default())))
}

/// POST /weather
///
/// Invalid input re-renders the form with 422 and creates nothing. Success
/// redirects to the detail page with the queued flash.
pub async fn store(
    State(state): State<AppState>,
    Form(input): Form<CreateWeatherRequest>,
) -> PageResult<Response> {
    match submit(&state, &input.location).await {
        Ok(request) => {
            Ok(Redirect::to(&format!("/weather/{}?queued=1", request.id)).into_response())
        }
        Err(AppError::Core(CoreError::Validation(message))) => {
            let recent = state.store.list_recent(RECENT_LIMIT).await?;
            let form = FormState {
                location: &input.location,
                error: Some(&message),
            };
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(views::index_page(&recent, &form)),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /weather/{id}
///
/// A non-numeric id renders the 404 page like a missing record.
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<ShowParams>,
) -> PageResult<Response> {
    let Ok(id) = raw_id.parse::<DbId>() else {
        return Ok(not_found().await.into_response());
    };
    let request = find_or_404(&state, id).await?;
    Ok(Html(views::show_page(&request, params.is_queued())?).into_response())
}

/// Fallback for unmatched paths.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(views::error_page(StatusCode::NOT_FOUND, "Page not found")),
    )
}
