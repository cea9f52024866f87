//! Service information at `/`, served when no frontend is configured.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Every endpoint the service exposes.
pub const ENDPOINTS: [&str; 7] = [
    "/api/health",
    "/api/start-story",
    "/api/make-choice",
    "/api/generate-media",
    "/api/story-status/{session_id}",
    "/api/media-files",
    "/api/media/{filename}",
];

/// Service information response.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    /// Greeting.
    pub message: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether a generative provider is configured.
    pub generation_available: bool,
    /// Available endpoints.
    pub endpoints: &'static [&'static str],
}

/// GET /
async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "DreamDirector API",
        version: env!("CARGO_PKG_VERSION"),
        generation_available: state.generation_available(),
        endpoints: &ENDPOINTS,
    })
}

/// Returns the service info router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(service_info))
}
