use std::sync::Arc;
use std::time::Duration;

use crate::openweather::{OpenWeatherClient, DEFAULT_BASE_URL};
use crate::simulated::SimulatedSource;
use crate::source::{FetchError, WeatherSource};

/// Weather source configuration loaded from environment variables.
#[derive(Clone)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. `None` selects the simulated source.
    pub api_key: Option<String>,
    /// Provider base URL (default: `https://api.openweathermap.org`).
    pub base_url: String,
    /// Outbound request timeout in seconds (default: `10`).
    pub timeout_secs: u64,
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl WeatherConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                          |
    /// |-----------------------------|----------------------------------|
    /// | `WEATHER_API_KEY`           | unset (simulated)                |
    /// | `WEATHER_API_BASE_URL`      | `https://api.openweathermap.org` |
    /// | `WEATHER_HTTP_TIMEOUT_SECS` | `10`                             |
    ///
    /// An empty or whitespace-only `WEATHER_API_KEY` counts as unset.
    pub fn from_env() -> Self {
        let api_key = std::env::var("WEATHER_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let base_url =
            std::env::var("WEATHER_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let timeout_secs: u64 = std::env::var("WEATHER_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("WEATHER_HTTP_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            timeout_secs,
        }
    }
}

/// Select the weather source for this process.
///
/// With an API key the live OpenWeatherMap client is used; without one,
/// the simulated source.
pub fn build_source(config: &WeatherConfig) -> Result<Arc<dyn WeatherSource>, FetchError> {
    match &config.api_key {
        Some(key) => {
            let client = OpenWeatherClient::new(
                key.clone(),
                config.base_url.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            tracing::info!(base_url = %config.base_url, "Using live OpenWeatherMap source");
            Ok(Arc::new(client))
        }
        None => {
            tracing::warn!("WEATHER_API_KEY not set, using simulated weather data");
            Ok(Arc::new(SimulatedSource))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_key_selects_simulated_source() {
        let source = build_source(&WeatherConfig::default()).unwrap();
        assert_eq!(source.name(), "simulated");
    }

    #[test]
    fn key_selects_openweather_source() {
        let config = WeatherConfig {
            api_key: Some("KEY".into()),
            ..WeatherConfig::default()
        };
        let source = build_source(&config).unwrap();
        assert_eq!(source.name(), "openweather");
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = WeatherConfig {
            api_key: Some("super-secret".into()),
            ..WeatherConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
