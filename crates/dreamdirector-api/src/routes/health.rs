//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether a generative provider is configured.
    pub generation_available: bool,
    /// Absolute path of the media directory.
    pub media_directory: String,
}

/// GET /api/health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let dir = state.media.media_directory();
    let media_directory = std::path::absolute(dir)
        .unwrap_or_else(|_| dir.to_path_buf())
        .display()
        .to_string();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        generation_available: state.generation_available(),
        media_directory,
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}
