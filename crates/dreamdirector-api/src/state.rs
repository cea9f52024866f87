//! Shared application state.

use std::sync::Arc;

use dreamdirector_core::clock::Clock;
use dreamdirector_core::error::DomainError;
use dreamdirector_core::provider::ProviderSet;
use dreamdirector_core::repository::EventRepository;
use dreamdirector_media::MediaLibrary;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of timestamps and file stamps.
    pub clock: Arc<dyn Clock>,
    /// Story session event streams.
    pub event_repository: Arc<dyn EventRepository>,
    /// Generated media on disk.
    pub media: Arc<MediaLibrary>,
    /// Generative providers; `None` when no API key is configured.
    pub providers: Option<ProviderSet>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_repository: Arc<dyn EventRepository>,
        media: Arc<MediaLibrary>,
        providers: Option<ProviderSet>,
    ) -> Self {
        Self {
            clock,
            event_repository,
            media,
            providers,
        }
    }

    /// Whether story and media generation can run.
    #[must_use]
    pub fn generation_available(&self) -> bool {
        self.providers.is_some()
    }

    /// The configured providers.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unavailable` when none are configured.
    pub fn providers(&self) -> Result<&ProviderSet, DomainError> {
        self.providers.as_ref().ok_or_else(|| {
            DomainError::Unavailable(
                "no generative provider is configured; set GOOGLE_API_KEY".into(),
            )
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("media", &self.media)
            .field("generation_available", &self.generation_available())
            .finish_non_exhaustive()
    }
}
