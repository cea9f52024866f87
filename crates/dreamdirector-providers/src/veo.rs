//! Veo video adapter.
//!
//! Video generation is a long-running operation: the adapter starts it,
//! polls the operation until it is done, then downloads the first sample.

use std::time::Duration;

use async_trait::async_trait;
use dreamdirector_core::provider::{GeneratedAsset, ProviderError, VideoGenerator};
use serde::{Deserialize, Serialize};

use crate::client::{GenAiClient, decode_base64};

/// Video generation through `models/{model}:predictLongRunning`.
#[derive(Debug, Clone)]
pub struct VeoVideoGenerator {
    client: GenAiClient,
    model: String,
    poll_interval: Duration,
    max_polls: u32,
}

#[derive(Serialize)]
struct VideoRequest<'a> {
    instances: [VideoInstance<'a>; 1],
    parameters: VideoParameters,
}

#[derive(Serialize)]
struct VideoInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: &'static str,
    duration_seconds: u32,
    sample_count: u32,
}

#[derive(Deserialize)]
struct Operation {
    name: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Deserialize)]
struct OperationError {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoRef {
    uri: Option<String>,
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

impl VeoVideoGenerator {
    /// Adapter for `model`, polling every `poll_interval` at most
    /// `max_polls` times.
    #[must_use]
    pub fn new(client: GenAiClient, model: &str, poll_interval: Duration, max_polls: u32) -> Self {
        Self {
            client,
            model: model.to_owned(),
            poll_interval,
            max_polls,
        }
    }

    async fn wait_for(&self, mut operation: Operation) -> Result<Operation, ProviderError> {
        let mut polls = 0;
        while !operation.done {
            let name = operation
                .name
                .clone()
                .ok_or_else(|| ProviderError::Malformed("operation has no name".into()))?;
            if polls >= self.max_polls {
                tracing::warn!(operation = %name, polls, "video generation timed out");
                return Err(ProviderError::TimedOut(polls));
            }
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;
            operation = self.client.get_json(&name).await?;
            tracing::debug!(
                operation = %name,
                polls,
                done = operation.done,
                "polled video operation"
            );
        }
        Ok(operation)
    }

    async fn fetch(&self, video: VideoRef) -> Result<GeneratedAsset, ProviderError> {
        let mime_type = video.mime_type.unwrap_or_else(|| "video/mp4".to_owned());
        let bytes = match (video.bytes_base64_encoded, video.uri) {
            (Some(encoded), _) => decode_base64(&encoded)?,
            (None, Some(uri)) => self.client.download(&uri).await?,
            (None, None) => return Err(ProviderError::Empty),
        };
        if bytes.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(GeneratedAsset { bytes, mime_type })
    }
}

#[async_trait]
impl VideoGenerator for VeoVideoGenerator {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate_video(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        let request = VideoRequest {
            instances: [VideoInstance { prompt }],
            parameters: VideoParameters {
                aspect_ratio: "16:9",
                duration_seconds: 8,
                sample_count: 1,
            },
        };
        let started: Operation = self
            .client
            .post_json(&format!("models/{}:predictLongRunning", self.model), &request)
            .await?;
        let finished = self.wait_for(started).await?;

        if let Some(error) = finished.error {
            return Err(ProviderError::Failed(
                error.message.unwrap_or_else(|| "unknown error".to_owned()),
            ));
        }
        let video = finished
            .response
            .and_then(|r| r.generate_video_response)
            .and_then(|r| r.generated_samples.into_iter().find_map(|s| s.video))
            .ok_or(ProviderError::Empty)?;
        self.fetch(video).await
    }
}
