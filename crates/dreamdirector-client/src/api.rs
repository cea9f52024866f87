//! HTTP client for the DreamDirector backend.

use dreamdirector_core::media::MediaKind;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{ClientError, GENERIC_ERROR_MESSAGE};
use crate::store::Story;

/// Result of an on-demand generation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedMedia {
    /// What was requested.
    pub requested: MediaKind,
    /// What was produced; a video request may come back as an image.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// How the backend produced it.
    pub method: String,
    /// Message for the player.
    pub message: String,
    /// Stored file name.
    pub filename: String,
    /// Relative URL of the file.
    pub url: String,
    /// Files of this kind on the backend.
    pub total_files: usize,
}

/// Every generated file the backend knows of.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaFiles {
    /// Image file names.
    #[serde(default)]
    pub images: Vec<String>,
    /// Video file names.
    #[serde(default)]
    pub videos: Vec<String>,
    /// Music file names.
    #[serde(default)]
    pub music: Vec<String>,
}

impl MediaFiles {
    /// File names of one kind.
    #[must_use]
    pub fn of(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Image => &self.images,
            MediaKind::Video => &self.videos,
            MediaKind::Music => &self.music,
        }
    }
}

/// Backend health.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    /// `healthy` when up.
    pub status: String,
    /// Whether generation can run.
    #[serde(default)]
    pub generation_available: bool,
}

#[derive(Serialize)]
struct StartStoryBody<'a> {
    story_request: &'a str,
}

#[derive(Serialize)]
struct MakeChoiceBody<'a> {
    session_id: Uuid,
    choice: &'a str,
}

#[derive(Serialize)]
struct GenerateMediaBody<'a> {
    #[serde(rename = "type")]
    kind: MediaKind,
    prompt: &'a str,
    emotional_tone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

/// Thin wrapper over `reqwest` for the backend's JSON endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// A client for the backend at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a relative media URL such as `/api/media/x.png`.
    #[must_use]
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_owned()
        } else {
            format!("{}{url}", self.base_url)
        }
    }

    /// GET /api/health
    ///
    /// # Errors
    ///
    /// Returns `ClientError` when the request fails.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        decode(response).await
    }

    /// POST /api/start-story
    ///
    /// # Errors
    ///
    /// Returns `ClientError` when the request fails.
    #[instrument(skip(self, story_request))]
    pub async fn start_story(&self, story_request: &str) -> Result<Story, ClientError> {
        let response = self
            .http
            .post(self.url("/api/start-story"))
            .json(&StartStoryBody { story_request })
            .send()
            .await?;
        decode(response).await
    }

    /// POST /api/make-choice
    ///
    /// # Errors
    ///
    /// Returns `ClientError` when the request fails.
    #[instrument(skip(self, choice))]
    pub async fn make_choice(&self, session_id: Uuid, choice: &str) -> Result<Story, ClientError> {
        let response = self
            .http
            .post(self.url("/api/make-choice"))
            .json(&MakeChoiceBody { session_id, choice })
            .send()
            .await?;
        decode(response).await
    }

    /// POST /api/generate-media
    ///
    /// # Errors
    ///
    /// Returns `ClientError` when the request fails.
    #[instrument(skip(self, prompt))]
    pub async fn generate_media(
        &self,
        kind: MediaKind,
        prompt: &str,
        emotional_tone: &str,
        session_id: Option<Uuid>,
    ) -> Result<GeneratedMedia, ClientError> {
        let response = self
            .http
            .post(self.url("/api/generate-media"))
            .json(&GenerateMediaBody {
                kind,
                prompt,
                emotional_tone,
                session_id,
            })
            .send()
            .await?;
        decode(response).await
    }

    /// GET /api/media-files
    ///
    /// # Errors
    ///
    /// Returns `ClientError` when the request fails.
    #[instrument(skip(self))]
    pub async fn media_files(&self) -> Result<MediaFiles, ClientError> {
        let response = self.http.get(self.url("/api/media-files")).send().await?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await.unwrap_or_default();
    debug!(%status, %body, "backend returned an error");
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.detail))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_owned());
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn story_json() -> serde_json::Value {
        serde_json::json!({
            "session_id": Uuid::nil(),
            "narrative": "The rain never stops.",
            "choices": ["Follow", "Hide", "Call"],
            "scene_description": "Neo-Tokyo",
            "mood": "mysterious",
            "scene_id": "opening_scene",
            "story_complete": false,
            "story_progression": [],
            "choices_remaining": 5,
            "current_choice": 0,
            "total_choices": 5
        })
    }

    #[tokio::test]
    async fn test_start_story_posts_request_and_decodes_story() {
        // Arrange
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/start-story")
            .match_body(Matcher::Json(serde_json::json!({ "story_request": "noir" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(story_json().to_string())
            .create_async()
            .await;
        let client = ApiClient::new(server.url());

        // Act
        let story = client.start_story("noir").await.unwrap();

        // Assert
        mock.assert_async().await;
        assert_eq!(story.scene_description, "Neo-Tokyo");
        assert_eq!(story.choices.len(), 3);
    }

    #[tokio::test]
    async fn test_error_message_comes_from_message_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/make-choice")
            .with_status(409)
            .with_body(r#"{"error":"story_complete","message":"story is already complete"}"#)
            .create_async()
            .await;
        let client = ApiClient::new(server.url());

        let err = client.make_choice(Uuid::nil(), "go").await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Api { status: 409, ref message } if message == "story is already complete"
        ));
    }

    #[tokio::test]
    async fn test_error_message_falls_back_to_detail_then_generic() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/media-files")
            .with_status(500)
            .with_body(r#"{"detail":"disk on fire"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/health")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;
        let client = ApiClient::new(server.url());

        let detail = client.media_files().await.unwrap_err();
        let generic = client.health().await.unwrap_err();

        assert_eq!(detail.user_message(), "disk on fire");
        assert_eq!(generic.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_generate_media_sends_type_and_omits_missing_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate-media")
            .match_body(Matcher::Json(serde_json::json!({
                "type": "video",
                "prompt": "storm",
                "emotional_tone": "tense"
            })))
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "status": "success",
                    "requested": "video",
                    "type": "image",
                    "method": "fallback_to_image",
                    "message": "Generated a cinematic image",
                    "filename": "generated_scene_1.png",
                    "url": "/api/media/generated_scene_1.png",
                    "total_files": 1,
                    "all_files": ["generated_scene_1.png"]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let client = ApiClient::new(server.url());

        let media = client
            .generate_media(MediaKind::Video, "storm", "tense", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(media.kind, MediaKind::Image);
        assert_eq!(media.requested, MediaKind::Video);
    }

    #[test]
    fn test_absolute_url_joins_relative_paths() {
        let client = ApiClient::new("http://localhost:8000/");

        assert_eq!(
            client.absolute_url("/api/media/a.png"),
            "http://localhost:8000/api/media/a.png"
        );
        assert_eq!(client.absolute_url("https://cdn/x.png"), "https://cdn/x.png");
    }
}
