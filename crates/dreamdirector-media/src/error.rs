//! Media library errors.

use std::path::PathBuf;

use dreamdirector_core::error::DomainError;
use thiserror::Error;

/// Failure reading or writing generated media.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The name is not a bare file name.
    #[error("invalid media filename: {0}")]
    InvalidFilename(String),

    /// No search directory holds the file.
    #[error("media file not found: {0}")]
    NotFound(String),

    /// Filesystem failure.
    #[error("{action} {path}: {source}")]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// The path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl MediaError {
    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

impl From<MediaError> for DomainError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidFilename(name) => {
                DomainError::Validation(format!("invalid media filename: {name}"))
            }
            MediaError::NotFound(name) => DomainError::MediaNotFound(name),
            err @ MediaError::Io { .. } => DomainError::Infrastructure(err.to_string()),
        }
    }
}
