use async_trait::async_trait;

/// Weather data as returned by a source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedWeather {
    /// Location name reported by the source, or the requested one.
    pub location: String,
    /// Temperature in °C. Kept as a JSON number so integral values render
    /// without a fractional part.
    pub temperature: Option<serde_json::Number>,
    pub condition: String,
    /// Source payload, verbatim.
    pub raw: String,
}

/// Errors from fetching weather data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The provider answered with a non-2xx status.
    #[error("Weather API request failed with status {status}")]
    Status {
        status: u16,
        /// Truncated response body for logs.
        body: String,
    },

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Weather API request failed: {0}")]
    Request(reqwest::Error),

    /// The provider payload could not be parsed, or the normalized result
    /// could not be encoded.
    #[error("Invalid weather payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    /// Strips the request URL, which carries the API key in its query.
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err.without_url())
    }
}

/// A strategy for obtaining weather for a location.
///
/// Chosen once at startup from configuration and injected into the
/// processor; implementations never consult the environment themselves.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Short name for logs (`"openweather"`, `"simulated"`).
    fn name(&self) -> &'static str;

    async fn fetch(&self, location: &str) -> Result<FetchedWeather, FetchError>;
}
