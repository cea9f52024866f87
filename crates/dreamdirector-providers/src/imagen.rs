//! Imagen still-image adapter.

use async_trait::async_trait;
use dreamdirector_core::provider::{GeneratedAsset, ImageGenerator, ProviderError};
use serde::{Deserialize, Serialize};

use crate::client::{GenAiClient, decode_base64};

/// Image generation through `models/{model}:predict`.
#[derive(Debug, Clone)]
pub struct ImagenImageGenerator {
    client: GenAiClient,
    model: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [Instance<'a>; 1],
    parameters: Parameters,
}

#[derive(Serialize)]
struct Instance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    sample_count: u32,
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
pub(crate) struct PredictResponse {
    #[serde(default)]
    pub(crate) predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Prediction {
    pub(crate) bytes_base64_encoded: Option<String>,
    pub(crate) mime_type: Option<String>,
}

impl PredictResponse {
    /// Bytes and content type of the first prediction carrying data.
    pub(crate) fn first_asset(self, default_mime: &str) -> Result<GeneratedAsset, ProviderError> {
        let prediction = self
            .predictions
            .into_iter()
            .find(|p| p.bytes_base64_encoded.is_some())
            .ok_or(ProviderError::Empty)?;
        let bytes = decode_base64(prediction.bytes_base64_encoded.as_deref().unwrap_or_default())?;
        if bytes.is_empty() {
            return Err(ProviderError::Empty);
        }
        Ok(GeneratedAsset {
            bytes,
            mime_type: prediction
                .mime_type
                .unwrap_or_else(|| default_mime.to_owned()),
        })
    }
}

impl ImagenImageGenerator {
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
impl ImageGenerator for ImagenImageGenerator {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedAsset, ProviderError> {
        let request = PredictRequest {
            instances: [Instance { prompt }],
            parameters: Parameters {
                sample_count: 1,
                aspect_ratio: "16:9",
            },
        };
        let response: PredictResponse = self
            .client
            .post_json(&format!("models/{}:predict", self.model), &request)
            .await?;
        response.first_asset("image/png")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    fn generator(server: &mockito::ServerGuard) -> ImagenImageGenerator {
        let mut config = ProviderConfig::new("test-key");
        config.base_url = server.url();
        ImagenImageGenerator::new(GenAiClient::new(&config).unwrap(), "imagen-3.0-generate-002")
    }

    #[tokio::test]
    async fn test_generate_image_decodes_first_prediction() {
        // Arrange
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/imagen-3.0-generate-002:predict")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "instances": [{"prompt": "a castle"}],
                "parameters": {"sampleCount": 1, "aspectRatio": "16:9"}
            })))
            .with_body(r#"{"predictions":[{"bytesBase64Encoded":"iVBORw==","mimeType":"image/png"}]}"#)
            .create_async()
            .await;

        // Act
        let asset = generator(&server).generate_image("a castle").await.unwrap();

        // Assert
        assert_eq!(asset.bytes, vec![0x89, 0x50, 0x4E, 0x47]);
        assert_eq!(asset.mime_type, "image/png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_image_with_filtered_output_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/imagen-3.0-generate-002:predict")
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let result = generator(&server).generate_image("a castle").await;

        assert_eq!(result, Err(ProviderError::Empty));
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/imagen-3.0-generate-002:predict")
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let result = generator(&server).generate_image("a castle").await;

        assert_eq!(
            result,
            Err(ProviderError::Http {
                status: 500,
                message: "internal".into()
            })
        );
    }
}
