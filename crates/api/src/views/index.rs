//! `GET /weather`: submission form and recent requests.

use chrono::Utc;
use skyqueue_db::models::weather_request::WeatherRequest;

use super::{escape_html, layout, status_badge};
use crate::presenter;

/// Form state carried back into the page after a rejected submission.
#[derive(Debug, Default)]
pub struct FormState<'a> {
    /// Previously submitted value, echoed back into the input.
    pub location: &'a str,
    pub error: Option<&'a str>,
}

pub fn index_page(recent: &[WeatherRequest], form: &FormState<'_>) -> String {
    let error = form
        .error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();

    let body = format!(
        r#"<div class="card">
<h1>Weather requests</h1>
<form method="post" action="/weather">
<label for="location">Location</label><br>
<input type="text" id="location" name="location" maxlength="255" value="{location}" placeholder="e.g. London" required>
<button type="submit">Get weather</button>
{error}
</form>
</div>
<div class="card">
<h2>Recent requests</h2>
{table}
</div>"#,
        location = escape_html(form.location),
        table = recent_table(recent),
    );

    layout("Weather requests", &body)
}

fn recent_table(recent: &[WeatherRequest]) -> String {
    if recent.is_empty() {
        return "<p>No weather requests yet.</p>".to_string();
    }

    let now = Utc::now();
    let rows: String = recent
        .iter()
        .map(|r| {
            format!(
                r#"<tr><td><a href="/weather/{id}">{location}</a></td><td>{badge}</td><td>{temperature}</td><td>{created}</td></tr>
"#,
                id = r.id,
                location = escape_html(&r.location),
                badge = status_badge(&r.status),
                temperature = if presenter::is_completed(r) {
                    escape_html(&presenter::temperature_for_display(r))
                } else {
                    String::new()
                },
                created = presenter::relative_time(r.created_at, now),
            )
        })
        .collect();

    format!(
        "<table>\n<thead><tr><th>Location</th><th>Status</th><th>Temperature</th><th>Requested</th></tr></thead>\n<tbody>\n{rows}</tbody>\n</table>"
    )
}
