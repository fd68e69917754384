//! Fixed weather used when no API key is configured.

use async_trait::async_trait;
use serde::Serialize;

use crate::source::{FetchError, FetchedWeather, WeatherSource};

/// Simulated temperature, in °C.
pub const SIMULATED_TEMPERATURE: i64 = 20;

pub const SIMULATED_CONDITION: &str = "Clear (simulated - no API key set)";

#[derive(Serialize)]
struct SimulatedPayload<'a> {
    location: &'a str,
    temperature: i64,
    condition: &'a str,
}

/// Source that always reports clear skies at 20°C without any network I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSource;

#[async_trait]
impl WeatherSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn fetch(&self, location: &str) -> Result<FetchedWeather, FetchError> {
        let raw = serde_json::to_string(&SimulatedPayload {
            location,
            temperature: SIMULATED_TEMPERATURE,
            condition: SIMULATED_CONDITION,
        })?;

        Ok(FetchedWeather {
            location: location.to_string(),
            temperature: Some(SIMULATED_TEMPERATURE.into()),
            condition: SIMULATED_CONDITION.to_string(),
            raw,
        })
    }
}
