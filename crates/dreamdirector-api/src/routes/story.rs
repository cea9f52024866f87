//! Routes for playing a story: start, choose, inspect.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use dreamdirector_story::application::command_handlers::{self, StoryTurnView};
use dreamdirector_story::application::query_handlers::{self, StoryStatusView};
use dreamdirector_story::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /api/start-story.
#[derive(Debug, Deserialize)]
pub struct StartStoryRequest {
    /// The story the player wants, in their own words.
    pub story_request: String,
}

/// Request body for POST /api/make-choice.
#[derive(Debug, Deserialize)]
pub struct MakeChoiceRequest {
    /// Session returned by start-story.
    pub session_id: Uuid,
    /// The chosen option.
    pub choice: String,
}

/// POST /api/start-story
#[instrument(skip(state, request))]
async fn start_story(
    State(state): State<AppState>,
    Json(request): Json<StartStoryRequest>,
) -> Result<Json<StoryTurnView>, ApiError> {
    let providers = state.providers()?;
    let command = commands::StartStory {
        correlation_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        request: request.story_request,
    };

    info!(
        correlation_id = %command.correlation_id,
        session_id = %command.session_id,
        "handling start_story command"
    );

    let view = command_handlers::handle_start_story(
        &command,
        providers,
        state.media.as_ref(),
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(view))
}

/// POST /api/make-choice
#[instrument(skip(state, request), fields(session_id = %request.session_id))]
async fn make_choice(
    State(state): State<AppState>,
    Json(request): Json<MakeChoiceRequest>,
) -> Result<Json<StoryTurnView>, ApiError> {
    let providers = state.providers()?;
    let command = commands::MakeChoice {
        correlation_id: Uuid::new_v4(),
        session_id: request.session_id,
        choice: request.choice,
    };

    info!(correlation_id = %command.correlation_id, "handling make_choice command");

    let view = command_handlers::handle_make_choice(
        &command,
        providers,
        state.media.as_ref(),
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(view))
}

/// GET /api/story-status/{session_id}
#[instrument(skip(state))]
async fn story_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<StoryStatusView>, ApiError> {
    let view = query_handlers::get_story_status(session_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// Returns the router for story play.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/start-story", post(start_story))
        .route("/api/make-choice", post(make_choice))
        .route("/api/story-status/{session_id}", get(story_status))
}
