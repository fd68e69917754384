pub mod pages;
pub mod weather_requests;
