//! Scripted generative providers.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dreamdirector_core::provider::{
    GeneratedAsset, ImageGenerator, MusicGenerator, ProviderError, ProviderSet, TextGenerator,
    VideoGenerator,
};

/// Returns queued responses in order and records every prompt. Once the
/// queue is drained every call fails with `ProviderError::Empty`.
#[derive(Debug, Default)]
pub struct ScriptedTextGenerator {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTextGenerator {
    /// Queue successful responses.
    #[must_use]
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(responses.into_iter().map(|r| Ok(r.into())))
    }

    /// Queue a mix of successes and failures.
    #[must_use]
    pub fn with_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ProviderError>>,
    {
        Self {
            responses: Mutex::new(results.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedTextGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::Empty))
    }
}

/// Returns the same bytes for every image, video and music request.
#[derive(Debug)]
pub struct StaticAssetGenerator {
    bytes: Vec<u8>,
    mime_type: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StaticAssetGenerator {
    /// Create a generator returning `bytes` tagged with `mime_type`.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: &str) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.to_owned(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of generations served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every prompt received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn serve(&self, prompt: &str) -> GeneratedAsset {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_owned());
        GeneratedAsset {
            bytes: self.bytes.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

impl Default for StaticAssetGenerator {
    fn default() -> Self {
        Self::new(b"asset".to_vec(), "application/octet-stream")
    }
}

#[async_trait]
impl ImageGenerator for StaticAssetGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        Ok(self.serve(prompt))
    }
}

#[async_trait]
impl VideoGenerator for StaticAssetGenerator {
    async fn generate_video(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        Ok(self.serve(prompt))
    }
}

#[async_trait]
impl MusicGenerator for StaticAssetGenerator {
    async fn generate_music(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        Ok(self.serve(prompt))
    }
}

/// Fails every request with a network error.
#[derive(Debug, Clone, Copy)]
pub struct FailingProvider;

fn refused() -> ProviderError {
    ProviderError::Network("connection refused".into())
}

#[async_trait]
impl TextGenerator for FailingProvider {
    async fn generate_text(&self, _prompt: &str) -> Result<String, ProviderError> {
        Err(refused())
    }
}

#[async_trait]
impl ImageGenerator for FailingProvider {
    async fn generate_image(&self, _prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        Err(refused())
    }
}

#[async_trait]
impl VideoGenerator for FailingProvider {
    async fn generate_video(&self, _prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        Err(refused())
    }
}

#[async_trait]
impl MusicGenerator for FailingProvider {
    async fn generate_music(&self, _prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        Err(refused())
    }
}

/// Bundles a text generator with one asset generator serving all media.
pub fn provider_set<T, A>(text: Arc<T>, assets: Arc<A>) -> ProviderSet
where
    T: TextGenerator + 'static,
    A: ImageGenerator + VideoGenerator + MusicGenerator + 'static,
{
    ProviderSet {
        text,
        image: assets.clone(),
        video: assets.clone(),
        music: assets,
    }
}
