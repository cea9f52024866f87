//! Shared HTTP plumbing for the Google adapters.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dreamdirector_core::provider::ProviderError;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ProviderConfig;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Authenticated client for the Generative Language API. Cheap to clone.
#[derive(Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl std::fmt::Debug for GenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GenAiClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Network` if the TLS backend fails to initialise.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').into(),
            api_key: config.api_key.as_str().into(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_owned()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` for transport failures, non-success
    /// statuses and bodies that do not decode as `R`.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ProviderError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(path))
            .header(API_KEY_HEADER, &*self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        decode(check(response).await?).await
    }

    /// GETs `path` and decodes the JSON reply.
    ///
    /// # Errors
    ///
    /// As [`GenAiClient::post_json`].
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ProviderError> {
        let response = self
            .http
            .get(self.url(path))
            .header(API_KEY_HEADER, &*self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        decode(check(response).await?).await
    }

    /// Downloads raw bytes from an absolute URI or an API path.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` for transport failures and non-success
    /// statuses.
    pub async fn download(&self, uri: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .http
            .get(self.url(uri))
            .header(API_KEY_HEADER, &*self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let bytes = check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

async fn check(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body))
}

async fn decode<R: DeserializeOwned>(response: Response) -> Result<R, ProviderError> {
    response
        .json()
        .await
        .map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// Classifies a non-success status.
pub(crate) fn status_error(status: StatusCode, body: String) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        _ => ProviderError::Http {
            status: status.as_u16(),
            message: body,
        },
    }
}

/// Decodes a base64 payload from a prediction.
pub(crate) fn decode_base64(encoded: &str) -> Result<Vec<u8>, ProviderError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| ProviderError::Malformed(format!("invalid base64 payload: {e}")))
}
