//! Routes for on-demand generation and the media library.

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderValue, header};
use axum::response::Response;
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::{info, instrument};
use uuid::Uuid;

use dreamdirector_core::media::MediaKind;
use dreamdirector_story::application::command_handlers::{self, MediaGenerationView};
use dreamdirector_story::domain::commands;
use dreamdirector_story::domain::prompts::DEFAULT_TONE;

use crate::error::ApiError;
use crate::state::AppState;

fn default_tone() -> String {
    DEFAULT_TONE.to_owned()
}

/// Request body for POST /api/generate-media.
#[derive(Debug, Deserialize)]
pub struct GenerateMediaRequest {
    /// `image`, `video` or `music`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Subject of the media.
    pub prompt: String,
    /// Emotional tone; defaults to `mysterious`.
    #[serde(default = "default_tone")]
    pub emotional_tone: String,
    /// Story session to style the media after.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

/// Response body for GET /api/media-files.
#[derive(Debug, Serialize)]
pub struct MediaFilesResponse {
    /// Image filenames, oldest first.
    pub images: Vec<String>,
    /// Video filenames, oldest first.
    pub videos: Vec<String>,
    /// Music filenames, oldest first.
    pub music: Vec<String>,
}

/// POST /api/generate-media
#[instrument(skip(state, request), fields(kind = %request.kind))]
async fn generate_media(
    State(state): State<AppState>,
    Json(request): Json<GenerateMediaRequest>,
) -> Result<Json<MediaGenerationView>, ApiError> {
    let kind: MediaKind = request.kind.parse()?;
    let providers = state.providers()?;
    let command = commands::GenerateMedia {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        kind,
        prompt: request.prompt,
        emotional_tone: request.emotional_tone,
    };

    info!(correlation_id = %command.correlation_id, "handling generate_media command");

    let view = command_handlers::handle_generate_media(
        &command,
        providers,
        state.media.as_ref(),
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(view))
}

/// GET /api/media-files
#[instrument(skip(state))]
async fn media_files(State(state): State<AppState>) -> Result<Json<MediaFilesResponse>, ApiError> {
    Ok(Json(MediaFilesResponse {
        images: state.media.files(MediaKind::Image).await?,
        videos: state.media.files(MediaKind::Video).await?,
        music: state.media.files(MediaKind::Music).await?,
    }))
}

/// GET /api/media/{filename}
///
/// Streams the file and honours `Range`, so players can seek.
#[instrument(skip(state, request))]
async fn media_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request: Request,
) -> Result<Response, ApiError> {
    let resolved = state.media.resolve(&filename).await?;
    let mut response = ServeFile::new(&resolved.path)
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    if response.status().is_success() {
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(resolved.content_type),
        );
    }
    Ok(response.map(Body::new))
}

/// Returns the router for media generation and serving.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/generate-media", post(generate_media))
        .route("/api/media-files", get(media_files))
        .route("/api/media/{filename}", get(media_file))
}
