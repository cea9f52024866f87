//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

use crate::provider::ProviderError;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No events exist for the requested story session.
    #[error("story session not found: {0}")]
    SessionNotFound(Uuid),

    /// Optimistic concurrency conflict.
    #[error("concurrency conflict on session {session_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The session that had the conflict.
        session_id: Uuid,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    /// The story already reached its finale and accepts no more choices.
    #[error("story session {0} is already complete")]
    StoryComplete(Uuid),

    /// Invalid caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A requested media file does not exist.
    #[error("media file not found: {0}")]
    MediaNotFound(String),

    /// A generative provider call failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Generation is not configured on this deployment.
    #[error("generation unavailable: {0}")]
    Unavailable(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
