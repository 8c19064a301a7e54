//! OpenRouter cloud embeddings (`POST {base_url}/embeddings`).
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the `Authorization` header.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vectorlab_core::embedding::Embedder;
use vectorlab_core::embedding::embedder::{check_dimension, check_input};
use vectorlab_types::config::OpenRouterConfig;
use vectorlab_types::error::{ConfigError, ProviderError};

use super::http::{client, endpoint, send_json};

const PROVIDER: &str = "openrouter";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// OpenRouter embedding provider.
///
/// Does NOT derive Debug so the key never ends up in logs.
pub struct OpenRouterEmbedder {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OpenRouterEmbedder {
    /// Fails with [`ConfigError::MissingApiKey`] when no key is configured.
    pub fn new(config: &OpenRouterConfig, dimension: usize) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey("OpenRouter".to_string()))?;

        Ok(Self {
            client: client(config.timeout_secs)?,
            api_key: SecretString::from(api_key.to_string()),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            dimension,
        })
    }
}

impl Embedder for OpenRouterEmbedder {
    #[tracing::instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        check_input(text)?;

        let request = self
            .client
            .post(endpoint(&self.base_url, "/embeddings"))
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            });
        let response: EmbeddingResponse = send_json(PROVIDER, request).await?;

        let vector = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::EmptyResponse(PROVIDER.to_string()))?;
        check_dimension(&vector, self.dimension)?;

        debug!(dimension = vector.len(), "embedding received");
        Ok(vector)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
