#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use skyqueue_core::types::DbId;
use skyqueue_db::models::weather_request::WeatherRequest;
use skyqueue_db::store::{MemoryRequestStore, RequestStore};
use skyqueue_weather::{FetchError, FetchedWeather, SimulatedSource, WeatherSource};
use skyqueue_worker::processor::RequestProcessor;
use skyqueue_worker::queue::{Dispatcher, JobQueue};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use skyqueue_api::config::ServerConfig;
use skyqueue_api::router::build_app_router;
use skyqueue_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        embedded_worker: true,
    }
}

/// A router over an in-memory store, with a live dispatcher using `source`.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryRequestStore>,
    pub cancel: CancellationToken,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Poll the store until the record reaches `completed` or `failed`.
    pub async fn wait_until_terminal(&self, id: DbId) -> WeatherRequest {
        for _ in 0..200 {
            if let Some(record) = self.store.find_by_id(id).await.unwrap() {
                if record.status().unwrap().is_terminal() {
                    return record;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("weather request {id} did not reach a terminal state");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// with the simulated weather source.
pub fn build_test_app() -> TestApp {
    build_test_app_with_source(Arc::new(SimulatedSource))
}

pub fn build_test_app_with_source(source: Arc<dyn WeatherSource>) -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryRequestStore::new());
    let dyn_store: Arc<dyn RequestStore> = Arc::clone(&store) as Arc<dyn RequestStore>;

    let processor = Arc::new(RequestProcessor::new(Arc::clone(&dyn_store), source));
    let (queue, receiver) = JobQueue::channel();
    let cancel = CancellationToken::new();
    tokio::spawn(Dispatcher::new(processor, 2).run(receiver, cancel.clone()));

    let state = AppState {
        store: dyn_store,
        queue,
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        cancel,
    }
}

/// Weather source whose provider always answers with the given HTTP status.
pub struct StatusSource(pub u16);

#[async_trait]
impl WeatherSource for StatusSource {
    fn name(&self) -> &'static str {
        "status"
    }

    async fn fetch(&self, _location: &str) -> Result<FetchedWeather, FetchError> {
        Err(FetchError::Status {
            status: self.0,
            body: "{\"message\":\"upstream error\"}".to_string(),
        })
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST an `application/x-www-form-urlencoded` body.
pub async fn post_form(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Extract the record id from a `/weather/{id}?queued=1` redirect.
pub fn redirect_id(response: &Response) -> DbId {
    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap();
    let id = location
        .strip_prefix("/weather/")
        .and_then(|rest| rest.split('?').next())
        .expect("unexpected redirect target");
    id.parse().unwrap()
}
