//! JSON handlers for weather requests under `/api/v1/weather-requests`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use skyqueue_core::error::CoreError;
use skyqueue_core::request::{validate_location, RECENT_LIMIT};
use skyqueue_core::types::DbId;
use skyqueue_db::models::weather_request::{CreateWeatherRequest, WeatherRequest};
use skyqueue_db::repositories::weather_request_repo::clamp_limit;

use crate::error::{AppError, AppResult};
use crate::presenter;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Derived display values returned alongside a record.
#[derive(Debug, Serialize)]
pub struct Presentation {
    pub in_progress: bool,
    pub status_color: &'static str,
    pub summary: Option<String>,
    pub temperature: String,
    pub condition: String,
}

/// A record plus its [`Presentation`].
#[derive(Debug, Serialize)]
pub struct WeatherRequestView {
    #[serde(flatten)]
    pub request: WeatherRequest,
    pub presentation: Presentation,
}

impl From<WeatherRequest> for WeatherRequestView {
    fn from(request: WeatherRequest) -> Self {
        let presentation = Presentation {
            in_progress: presenter::is_in_progress(&request),
            status_color: presenter::status_color(&request.status),
            summary: presenter::summary(&request),
            temperature: presenter::temperature_for_display(&request),
            condition: presenter::condition_for_display(&request),
        };
        Self {
            request,
            presentation,
        }
    }
}

/// Validate, persist as `pending`, and enqueue.
///
/// Shared by the form and JSON create paths. An enqueue failure is logged
/// but does not fail the request: the record stays `pending` and is picked
/// up by the next recovery pass.
pub(crate) async fn submit(state: &AppState, location: &str) -> AppResult<WeatherRequest> {
    let location = validate_location(location)?;
    let request = state.store.create(&location).await?;

    if let Err(e) = state.queue.enqueue(request.id) {
        tracing::error!(request_id = request.id, error = %e, "Failed to enqueue weather request");
    }

    tracing::info!(request_id = request.id, location = %request.location, "Weather request queued");
    Ok(request)
}

pub(crate) async fn find_or_404(state: &AppState, id: DbId) -> AppResult<WeatherRequest> {
    state
        .store
        .find_by_id(id)
        .await?
        .ok_or(AppError::Core(CoreError::request_not_found(id)))
}

/// GET /api/v1/weather-requests?limit=
///
/// Most recently created first. Default 10, at most 100.
pub async fn list_weather_requests(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit.unwrap_or(RECENT_LIMIT));
    let requests = state.store.list_recent(limit).await?;

    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/weather-requests
pub async fn create_weather_request(
    State(state): State<AppState>,
    Json(input): Json<CreateWeatherRequest>,
) -> AppResult<impl IntoResponse> {
    let request = submit(&state, &input.location).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/v1/weather-requests/{id}
pub async fn get_weather_request(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = find_or_404(&state, id).await?;

    Ok(Json(DataResponse {
        data: WeatherRequestView::from(request),
    }))
}
