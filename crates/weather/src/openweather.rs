//! HTTP client for the OpenWeatherMap current-weather endpoint.
//!
//! Issues `GET {base}/data/2.5/weather?q=..&appid=..&units=metric` using
//! [`reqwest`] and maps the response into [`FetchedWeather`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::source::{FetchError, FetchedWeather, WeatherSource};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Condition reported when the provider omits one.
const UNKNOWN_CONDITION: &str = "Unknown";

/// Maximum number of body bytes kept on a status error.
const MAX_ERROR_BODY: usize = 200;

/// Client for one OpenWeatherMap account.
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: Option<serde_json::Number>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

impl OpenWeatherClient {
    /// Create a client with its own connection pool and request timeout.
    ///
    /// * `base_url` - Scheme and host, e.g. `https://api.openweathermap.org`.
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_key, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Fetch current conditions for `location`.
    pub async fn current(&self, location: &str) -> Result<FetchedWeather, FetchError> {
        tracing::debug!(location, base_url = %self.base_url, "Requesting current weather");

        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[
                ("q", location),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(location, status = status.as_u16(), "Weather API returned an error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        parse_current(location, body)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    fn name(&self) -> &'static str {
        "openweather"
    }

    async fn fetch(&self, location: &str) -> Result<FetchedWeather, FetchError> {
        self.current(location).await
    }
}

/// Map a successful current-weather body into [`FetchedWeather`].
///
/// Missing fields fall back: temperature to `None`, condition to
/// `"Unknown"`, location to the requested one. The body is kept verbatim.
pub fn parse_current(requested: &str, body: String) -> Result<FetchedWeather, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(&body)?;

    let location = parsed
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| requested.to_string());
    let condition = parsed
        .weather
        .into_iter()
        .next()
        .and_then(|w| w.description)
        .unwrap_or_else(|| UNKNOWN_CONDITION.to_string());

    Ok(FetchedWeather {
        location,
        temperature: parsed.main.and_then(|m| m.temp),
        condition,
        raw: body,
    })
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
