//! Integration tests for `OpenWeatherClient` using wiremock.

use std::time::Duration;

use assert_matches::assert_matches;
use skyqueue_weather::{FetchError, OpenWeatherClient, WeatherSource};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::new("test-key".into(), server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_sends_expected_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "London",
            "main": { "temp": 14.2 },
            "weather": [{ "description": "light rain" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client(&server).fetch("London").await.unwrap();

    assert_eq!(fetched.location, "London");
    assert_eq!(fetched.condition, "light rain");
    assert_eq!(fetched.temperature.unwrap().to_string(), "14.2");
    assert!(fetched.raw.contains("light rain"));
}

#[tokio::test]
async fn test_fetch_server_error_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client(&server).fetch("London").await.unwrap_err();

    assert_matches!(err, FetchError::Status { status: 500, ref body } if body == "upstream exploded");
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_fetch_not_found_city() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch("Atlantis").await.unwrap_err();
    assert_matches!(err, FetchError::Status { status: 404, .. });
}

#[tokio::test]
async fn test_fetch_invalid_json_is_json_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).fetch("London").await.unwrap_err();
    assert_matches!(err, FetchError::Json(_));
}

#[tokio::test]
async fn test_network_error_does_not_leak_api_key() {
    // Nothing listens on port 9 of localhost.
    let client = OpenWeatherClient::new(
        "very-secret-key".into(),
        "http://127.0.0.1:9".into(),
        Duration::from_secs(2),
    )
    .unwrap();

    let err = client.fetch("London").await.unwrap_err();

    assert_matches!(err, FetchError::Request(_));
    assert!(!err.to_string().contains("very-secret-key"));
}
