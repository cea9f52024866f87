//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use dreamdirector_core::clock::Clock;
use dreamdirector_core::provider::ProviderSet;
use dreamdirector_media::MediaLibrary;
use dreamdirector_story::infrastructure::InMemoryEventRepository;
use dreamdirector_test_support::{
    FailingProvider, FixedClock, ScriptedTextGenerator, StaticAssetGenerator, provider_set,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use dreamdirector_api::build_router;
use dreamdirector_api::config::ServerConfig;
use dreamdirector_api::state::AppState;

/// A router over a temporary media directory. Sessions live as long as the
/// app, so clone `router` for each request.
pub struct TestApp {
    pub router: Router,
    pub media_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Scripted text and a static asset for every media kind.
pub fn scripted_providers() -> ProviderSet {
    provider_set(
        Arc::new(ScriptedTextGenerator::default()),
        Arc::new(StaticAssetGenerator::default()),
    )
}

/// Scripted text; every media call fails.
pub fn failing_media_providers() -> ProviderSet {
    provider_set(
        Arc::new(ScriptedTextGenerator::default()),
        Arc::new(FailingProvider),
    )
}

fn test_config(static_dir: Option<&std::path::Path>) -> ServerConfig {
    let mut config = ServerConfig::from_lookup(|_| None).unwrap();
    config.static_dir = static_dir.map(std::path::Path::to_path_buf);
    config
}

/// Build the full app router with a fixed clock, in-memory sessions and the
/// given providers. Uses the same router as `main.rs`.
pub fn build_test_app(providers: Option<ProviderSet>) -> TestApp {
    build_test_app_with_frontend(providers, None)
}

/// Like [`build_test_app`], serving `static_dir` as the frontend.
pub fn build_test_app_with_frontend(
    providers: Option<ProviderSet>,
    static_dir: Option<&std::path::Path>,
) -> TestApp {
    let media_dir = tempfile::tempdir().unwrap();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock::default());
    let media = MediaLibrary::open(media_dir.path(), Vec::new(), clock.clone()).unwrap();
    let app_state = AppState::new(
        clock,
        Arc::new(InMemoryEventRepository::new()),
        Arc::new(media),
        providers,
    );
    let router = build_router(app_state, &test_config(static_dir));
    TestApp { router, media_dir }
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, bytes) = get_bytes(app, uri).await;
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}

/// Send a GET request and return status, content type and raw body.
pub async fn get_bytes(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, content_type, body_bytes.to_vec())
}
