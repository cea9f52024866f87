//! Client configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Backend used when `DREAMDIRECTOR_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where the snapshot lives when `DREAMDIRECTOR_STATE_DIR` is unset.
pub const DEFAULT_STATE_DIR: &str = ".dreamdirector";

/// Delays after a story action before the media list is fetched again.
pub const MEDIA_REFRESH_DELAYS: [Duration; 2] = [Duration::from_secs(3), Duration::from_secs(10)];

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub api_url: String,
    /// Directory holding the saved snapshot.
    pub state_dir: PathBuf,
}

impl ClientConfig {
    /// Reads the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };
        Self {
            api_url: get("DREAMDIRECTOR_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
            state_dir: get("DREAMDIRECTOR_STATE_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(|_| None);

        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.state_dir, PathBuf::from(".dreamdirector"));
    }

    #[test]
    fn test_api_url_loses_trailing_slash() {
        let config = ClientConfig::from_lookup(|key| {
            (key == "DREAMDIRECTOR_API_URL").then(|| "https://dream.example/".to_owned())
        });

        assert_eq!(config.api_url, "https://dream.example");
    }
}
