//! Weather fetching: the [`WeatherSource`] strategy, its live OpenWeatherMap
//! and simulated implementations, and normalization of fetched data into the
//! columns stored on a completed request.

pub mod config;
pub mod normalize;
pub mod openweather;
pub mod simulated;
pub mod source;

pub use config::{build_source, WeatherConfig};
pub use openweather::OpenWeatherClient;
pub use simulated::SimulatedSource;
pub use source::{FetchError, FetchedWeather, WeatherSource};
