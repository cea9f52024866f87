//! Commands for story sessions.

use dreamdirector_core::media::MediaKind;
use uuid::Uuid;

/// Command to open a new adventure.
#[derive(Debug, Clone)]
pub struct StartStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Identifier the new session will use.
    pub session_id: Uuid,
    /// The story the player wants to live.
    pub request: String,
}

/// Command to resolve the player's choice.
#[derive(Debug, Clone)]
pub struct MakeChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session being played.
    pub session_id: Uuid,
    /// The chosen option, verbatim.
    pub choice: String,
}

/// Command to generate one media file on demand.
#[derive(Debug, Clone)]
pub struct GenerateMedia {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Session whose art style is applied and which records the file.
    pub session_id: Option<Uuid>,
    /// Requested media kind.
    pub kind: MediaKind,
    /// Subject of the media.
    pub prompt: String,
    /// Emotional tone, e.g. `mysterious` or `tense`.
    pub emotional_tone: String,
}
