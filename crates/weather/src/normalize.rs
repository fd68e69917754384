//! Normalization of fetched weather into the stored result shape.

use serde::{Deserialize, Serialize};
use skyqueue_core::request::StoredResult;

use crate::source::{FetchError, FetchedWeather};

/// The object serialized into `formatted_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedWeather {
    pub location: String,
    pub summary: String,
    pub temperature: Option<serde_json::Number>,
    pub condition: String,
}

/// Human-readable one-line summary.
pub fn build_summary(
    location: &str,
    temperature: Option<&serde_json::Number>,
    condition: &str,
) -> String {
    match temperature {
        Some(t) => format!("In {location}, it is {t}°C with {condition}."),
        None => format!("Weather data for {location}: {condition}."),
    }
}

/// Display form of a temperature, e.g. `"20°C"`.
pub fn display_temperature(temperature: &serde_json::Number) -> String {
    format!("{temperature}°C")
}

impl FetchedWeather {
    /// Build the normalized result for this fetch.
    pub fn formatted(&self) -> FormattedWeather {
        FormattedWeather {
            location: self.location.clone(),
            summary: build_summary(&self.location, self.temperature.as_ref(), &self.condition),
            temperature: self.temperature.clone(),
            condition: self.condition.clone(),
        }
    }

    /// Convert into the columns written on completion.
    pub fn into_stored(self) -> Result<StoredResult, FetchError> {
        let formatted_data = serde_json::to_string_pretty(&self.formatted())?;
        Ok(StoredResult {
            temperature: self.temperature.as_ref().map(display_temperature),
            formatted_data,
            condition: self.condition,
            raw_json: self.raw,
        })
    }
}
