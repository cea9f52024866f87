//! Gemini text adapter.

use async_trait::async_trait;
use dreamdirector_core::provider::{ProviderError, TextGenerator};
use serde::{Deserialize, Serialize};

use crate::client::GenAiClient;

/// Text generation through `models/{model}:generateContent`.
#[derive(Debug, Clone)]
pub struct GeminiTextGenerator {
    client: GenAiClient,
    model: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiTextGenerator {
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
impl TextGenerator for GeminiTextGenerator {
    #[tracing::instrument(
        skip(self, prompt),
        fields(model = %self.model, prompt_len = prompt.len())
    )]
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };
        let response: GenerateContentResponse = self
            .client
            .post_json(&format!("models/{}:generateContent", self.model), &request)
            .await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(text)
    }
}
