//! Provider configuration.

use std::time::Duration;

/// Public endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Credentials, endpoint and model names for the Google adapters.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Sent as `x-goog-api-key`.
    pub api_key: String,
    /// API root, without trailing slash.
    pub base_url: String,
    /// Gemini model for choices and narrative.
    pub text_model: String,
    /// Imagen model for stills.
    pub image_model: String,
    /// Veo model for clips.
    pub video_model: String,
    /// Lyria model for music.
    pub music_model: String,
    /// Wait between polls of a running video operation.
    pub video_poll_interval: Duration,
    /// Polls before a video generation is abandoned.
    pub video_max_polls: u32,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl ProviderConfig {
    /// Defaults against the public endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            text_model: "gemini-2.0-flash".to_owned(),
            image_model: "imagen-3.0-generate-002".to_owned(),
            video_model: "veo-2.0-generate-001".to_owned(),
            music_model: "lyria-002".to_owned(),
            video_poll_interval: Duration::from_secs(20),
            video_max_polls: 30,
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("video_model", &self.video_model)
            .field("music_model", &self.music_model)
            .field("video_poll_interval", &self.video_poll_interval)
            .field("video_max_polls", &self.video_max_polls)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
