//! Client error types.

use thiserror::Error;

/// Shown when the backend gives no usable explanation.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors raised by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend could not be reached or the response could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The backend's `message` or `detail`, or a generic fallback.
        message: String,
    },

    /// The saved snapshot could not be read or written.
    #[error("snapshot {action} failed: {source}")]
    Persistence {
        /// What was being attempted.
        action: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A snapshot or response body was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Text for the error notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Network(e) if e.is_connect() => {
                "Cannot reach the DreamDirector backend. Is it running?".to_owned()
            }
            _ => GENERIC_ERROR_MESSAGE.to_owned(),
        }
    }
}
