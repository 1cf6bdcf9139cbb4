//! Shared test harness: the production router over in-memory
//! collaborators, plus small request helpers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use skylark_api::config::ServerConfig;
use skylark_api::router::build_app_router;
use skylark_api::state::AppState;
use skylark_cloud::{MemoryObjectStore, MemoryQueue, MemoryRecordStore};
use skylark_pipeline::status::JobStatusService;

/// Handles to the collaborators behind a test app, for seeding state
/// and asserting on side effects.
pub struct TestContext {
    pub status: JobStatusService,
    pub start_queue: Arc<MemoryQueue>,
    pub objects: Arc<MemoryObjectStore>,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        signed_url_ttl: Duration::from_secs(3600),
    }
}

/// Build the full application router over in-memory collaborators.
///
/// This goes through [`build_app_router`], so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout,
/// tracing, panic recovery) that production uses.
pub fn build_test_app() -> (Router, TestContext) {
    let config = test_config();
    let status = JobStatusService::new(Arc::new(MemoryRecordStore::new()));
    let start_queue = Arc::new(MemoryQueue::new());
    let objects = Arc::new(MemoryObjectStore::new());

    let state = AppState {
        status: status.clone(),
        start_queue: start_queue.clone(),
        objects: objects.clone(),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    (
        app,
        TestContext {
            status,
            start_queue,
            objects,
        },
    )
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a POST request with an empty body against the app.
pub async fn post(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
