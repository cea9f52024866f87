//! Route modules, one per API surface.

pub mod health;
pub mod media;
pub mod root;
pub mod story;

use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};

use crate::error::ErrorBody;
use crate::state::AppState;

/// JSON 404 for unknown `/api` paths, so they never reach the frontend
/// fallback.
async fn api_not_found(uri: Uri) -> Response {
    let body = ErrorBody {
        error: "not_found",
        message: format!("no API route for {}", uri.path()),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

/// Returns the catch-all router for `/api/*`.
pub fn api_not_found_router() -> Router<AppState> {
    Router::new()
        .route("/api", any(api_not_found))
        .route("/api/{*rest}", any(api_not_found))
}
