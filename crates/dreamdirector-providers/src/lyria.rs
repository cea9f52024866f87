//! Lyria music adapter.

use async_trait::async_trait;
use dreamdirector_core::provider::{GeneratedAsset, MusicGenerator, ProviderError};
use serde::Serialize;

use crate::client::GenAiClient;
use crate::imagen::PredictResponse;

/// Music generation through `models/{model}:predict`, returning WAV audio.
#[derive(Debug, Clone)]
pub struct LyriaMusicGenerator {
    client: GenAiClient,
    model: String,
}

#[derive(Serialize)]
struct MusicRequest<'a> {
    instances: [MusicInstance<'a>; 1],
    parameters: MusicParameters,
}

#[derive(Serialize)]
struct MusicInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MusicParameters {
    sample_count: u32,
}

impl LyriaMusicGenerator {
    /// Adapter for `model`.
    #[must_use]
    pub fn new(client: GenAiClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_owned(),
        }
    }
}

#[async_trait]
impl MusicGenerator for LyriaMusicGenerator {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate_music(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        let request = MusicRequest {
            instances: [MusicInstance { prompt }],
            parameters: MusicParameters { sample_count: 1 },
        };
        let response: PredictResponse = self
            .client
            .post_json(&format!("models/{}:predict", self.model), &request)
            .await?;
        response.first_asset("audio/wav")
    }
}
