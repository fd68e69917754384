//! Display values derived from a stored weather request.
//!
//! Everything here is a pure function of the persisted row; nothing touches
//! the store or the weather source.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use skyqueue_core::request::RequestStatus;
use skyqueue_db::models::weather_request::WeatherRequest;
use skyqueue_weather::normalize::display_temperature;

/// Shown when neither the formatted payload nor the flat column has a value.
pub const NOT_AVAILABLE: &str = "n/a";

/// `true` while the request has not reached a terminal status.
///
/// An unrecognized status counts as neither in progress nor finished.
pub fn is_in_progress(request: &WeatherRequest) -> bool {
    matches!(request.status(), Ok(status) if !status.is_terminal())
}

pub fn is_failed(request: &WeatherRequest) -> bool {
    matches!(request.status(), Ok(RequestStatus::Failed))
}

pub fn is_completed(request: &WeatherRequest) -> bool {
    matches!(request.status(), Ok(RequestStatus::Completed))
}

/// Badge color for a status value. Unknown values get a neutral gray.
pub fn status_color(status: &str) -> &'static str {
    match status.parse::<RequestStatus>() {
        Ok(RequestStatus::Pending) => "#f97316",
        Ok(RequestStatus::Processing) => "#eab308",
        Ok(RequestStatus::Completed) => "#22c55e",
        Ok(RequestStatus::Failed) => "#ef4444",
        Err(_) => "#9ca3af",
    }
}

/// The parsed `formatted_data` object.
///
/// `None` when the column is absent, empty, not valid JSON, or not a JSON
/// object.
pub fn formatted(request: &WeatherRequest) -> Option<Map<String, Value>> {
    let raw = request.formatted_data.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(request_id = request.id, error = %e, "Unparseable formatted_data");
            None
        }
    }
}

pub fn summary(request: &WeatherRequest) -> Option<String> {
    match formatted(request)?.remove("summary")? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Temperature as shown to the user.
///
/// A numeric value from the formatted payload gets the `°C` suffix; a string
/// is shown as stored.
pub fn temperature_for_display(request: &WeatherRequest) -> String {
    let from_payload = formatted(request).and_then(|mut map| match map.remove("temperature") {
        Some(Value::Number(n)) => Some(display_temperature(&n)),
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    });

    from_payload
        .or_else(|| request.temperature.clone().filter(|t| !t.is_empty()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn condition_for_display(request: &WeatherRequest) -> String {
    let from_payload = formatted(request).and_then(|mut map| match map.remove("condition") {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    });

    from_payload
        .or_else(|| request.condition.clone().filter(|c| !c.is_empty()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Coarse "5 minutes ago" style age of `at` relative to `now`.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }

    let (value, unit) = match secs {
        0..=59 => (secs, "second"),
        60..=3_599 => (secs / 60, "minute"),
        3_600..=86_399 => (secs / 3_600, "hour"),
        86_400..=2_591_999 => (secs / 86_400, "day"),
        2_592_000..=31_535_999 => (secs / 2_592_000, "month"),
        _ => (secs / 31_536_000, "year"),
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}
