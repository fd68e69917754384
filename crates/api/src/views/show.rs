//! `GET /weather/{id}`: a single request with a block per lifecycle stage.

use chrono::Utc;
use skyqueue_core::error::CoreError;
use skyqueue_core::request::{RequestState, StoredResult};
use skyqueue_db::models::weather_request::WeatherRequest;

use super::{escape_html, layout, status_badge};
use crate::presenter;

/// Flash shown after a successful submission.
pub const QUEUED_FLASH: &str = "Weather request queued for processing.";

/// Render the detail page.
///
/// Fails with [`CoreError::Internal`] when the stored row does not form a
/// valid lifecycle state (unknown status, completed without a result).
pub fn show_page(request: &WeatherRequest, queued: bool) -> Result<String, CoreError> {
    let flash = if queued {
        format!(r#"<div class="flash">{QUEUED_FLASH}</div>"#)
    } else {
        String::new()
    };

    let detail = match request.state()? {
        RequestState::Pending => in_progress_block("Waiting for a worker to pick this request up."),
        RequestState::Processing => in_progress_block("Fetching the latest weather."),
        RequestState::Failed { reason } => failed_block(&reason),
        RequestState::Completed(result) => completed_block(request, &result),
    };

    let body = format!(
        r#"{flash}<div class="card">
<h1>{location}</h1>
<p>{badge} requested {created}</p>
{detail}
</div>
<p><a href="/weather">Back to weather requests</a></p>"#,
        location = escape_html(&request.location),
        badge = status_badge(&request.status),
        created = presenter::relative_time(request.created_at, Utc::now()),
    );

    Ok(layout(&request.location, &body))
}

fn in_progress_block(message: &str) -> String {
    // Poll until the worker reaches a terminal state.
    format!(
        r#"<meta http-equiv="refresh" content="3">
<p>{message} This page refreshes automatically.</p>"#
    )
}

fn failed_block(reason: &str) -> String {
    format!(
        r#"<h2>Request failed</h2>
<p class="error">{}</p>"#,
        escape_html(reason)
    )
}

fn completed_block(request: &WeatherRequest, result: &StoredResult) -> String {
    let summary = presenter::summary(request)
        .map(|s| format!("<p>{}</p>", escape_html(&s)))
        .unwrap_or_default();

    format!(
        r#"{summary}
<table>
<tr><th>Temperature</th><td>{temperature}</td></tr>
<tr><th>Condition</th><td>{condition}</td></tr>
</table>
<details>
<summary>Raw response</summary>
<pre>{raw}</pre>
</details>"#,
        temperature = escape_html(&presenter::temperature_for_display(request)),
        condition = escape_html(&presenter::condition_for_display(request)),
        raw = escape_html(&result.raw_json),
    )
}
