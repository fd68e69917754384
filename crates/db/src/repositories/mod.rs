pub mod weather_request_repo;

pub use weather_request_repo::WeatherRequestRepo;
