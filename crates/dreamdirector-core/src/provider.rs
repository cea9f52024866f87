//! Ports for the hosted generative services.
//!
//! The story director only sees these traits; the HTTP adapters live in
//! `dreamdirector-providers` and tests inject scripted fakes.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to a generative provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The provider throttled the request.
    #[error("rate limited by provider")]
    RateLimited,

    /// Any other non-success HTTP status.
    #[error("provider returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// The provider answered successfully but produced nothing.
    #[error("provider returned no content")]
    Empty,

    /// A long-running generation did not finish within the poll budget.
    #[error("generation still running after {0} polls")]
    TimedOut(u32),

    /// The provider reported the generation itself as failed.
    #[error("generation failed: {0}")]
    Failed(String),
}

/// Binary output of an image, video or music generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAsset {
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// Content type reported by the provider.
    pub mime_type: String,
}

/// Large-language-model text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Completes `prompt` and returns the generated text.
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Still image generation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Renders one image for `prompt`.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError>;
}

/// Video clip generation.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Renders one clip for `prompt`, waiting for completion.
    async fn generate_video(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError>;
}

/// Music track generation.
#[async_trait]
pub trait MusicGenerator: Send + Sync {
    /// Composes one track for `prompt`.
    async fn generate_music(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError>;
}

/// The full set of providers a story director calls.
#[derive(Clone)]
pub struct ProviderSet {
    /// Narrative and choice text.
    pub text: Arc<dyn TextGenerator>,
    /// Scene images.
    pub image: Arc<dyn ImageGenerator>,
    /// Video clips.
    pub video: Arc<dyn VideoGenerator>,
    /// Music tracks.
    pub music: Arc<dyn MusicGenerator>,
}

impl std::fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSet").finish_non_exhaustive()
    }
}
