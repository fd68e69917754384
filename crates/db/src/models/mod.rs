pub mod weather_request;
