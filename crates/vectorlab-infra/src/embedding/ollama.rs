//! Ollama providers: `/api/embed` for vectors, `/api/chat` for titles.

use serde::{Deserialize, Serialize};
use tracing::debug;

use vectorlab_core::embedding::embedder::{check_dimension, check_input};
use vectorlab_core::embedding::title::{TITLE_SYSTEM_PROMPT, clean_title, title_input};
use vectorlab_core::embedding::{Embedder, TitleSummarizer};
use vectorlab_types::config::OllamaConfig;
use vectorlab_types::error::{ConfigError, ProviderError};

use super::http::{client, endpoint, send_json};

const PROVIDER: &str = "ollama";

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

/// Embeddings from a local Ollama server.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    host: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &OllamaConfig, dimension: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            client: client(config.timeout_secs)?,
            host: config.host.clone(),
            model: config.embed_model.clone(),
            dimension,
        })
    }
}

impl Embedder for OllamaEmbedder {
    #[tracing::instrument(skip(self, text), fields(model = %self.model, chars = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        check_input(text)?;

        let request = self
            .client
            .post(endpoint(&self.host, "/api/embed"))
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
            });
        let response: EmbedResponse = send_json(PROVIDER, request).await?;

        let vector = response
            .embeddings
            .into_iter()
            .next()
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

/// Short titles from a small Ollama chat model.
pub struct OllamaTitleSummarizer {
    client: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaTitleSummarizer {
    pub fn new(config: &OllamaConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client: client(config.timeout_secs)?,
            host: config.host.clone(),
            model: config.title_model.clone(),
        })
    }
}

impl TitleSummarizer for OllamaTitleSummarizer {
    #[tracing::instrument(skip(self, text), fields(model = %self.model))]
    async fn summarize_title(&self, text: &str) -> Result<String, ProviderError> {
        check_input(text)?;

        let request = self
            .client
            .post(endpoint(&self.host, "/api/chat"))
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: TITLE_SYSTEM_PROMPT,
                    },
                    ChatMessage {
                        role: "user",
                        content: title_input(text),
                    },
                ],
                stream: false,
            });
        let response: ChatResponse = send_json(PROVIDER, request).await?;

        clean_title(&response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> OllamaConfig {
        OllamaConfig {
            host: server.uri(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_embed_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_json(json!({"model": "nomic-embed-text", "input": "vector search"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"embeddings": [[0.1, 0.2, 0.3, 0.4]]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(&config_for(&server), 4).unwrap();
        let vector = embedder.embed("vector search").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(embedder.provider_name(), "ollama");
        assert_eq!(embedder.model_name(), "nomic-embed-text");
    }

    #[tokio::test]
    async fn test_embed_dimension_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[0.1, 0.2]]})),
            )
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(&config_for(&server), 768).unwrap();
        assert!(matches!(
            embedder.embed("hello").await,
            Err(ProviderError::DimensionMismatch {
                expected: 768,
                actual: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_embed_empty_embeddings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": []})))
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(&config_for(&server), 4).unwrap();
        assert!(matches!(
            embedder.embed("hello").await,
            Err(ProviderError::EmptyResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_embed_http_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(&config_for(&server), 4).unwrap();
        match embedder.embed("hello").await {
            Err(ProviderError::Status { status, body, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "model not found");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(&config_for(&server), 4).unwrap();
        assert!(matches!(
            embedder.embed("hello").await,
            Err(ProviderError::Deserialization { .. })
        ));
    }

    #[tokio::test]
    async fn test_embed_rejects_empty_text_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let embedder = OllamaEmbedder::new(&config_for(&server), 4).unwrap();
        assert!(matches!(
            embedder.embed("   ").await,
            Err(ProviderError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_embed_unreachable_host() {
        let config = OllamaConfig {
            host: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };
        let embedder = OllamaEmbedder::new(&config, 4).unwrap();
        assert!(matches!(
            embedder.embed("hello").await,
            Err(ProviderError::Request { .. })
        ));
    }

    #[tokio::test]
    async fn test_title_request_and_cleanup() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({
                "model": "phi4-mini",
                "stream": false,
                "messages": [
                    {"role": "system", "content": TITLE_SYSTEM_PROMPT},
                    {"role": "user", "content": "How do I pick HNSW m?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": {"role": "assistant", "content": "\"Choosing HNSW Parameters\"\nExtra"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let titles = OllamaTitleSummarizer::new(&config_for(&server)).unwrap();
        let title = titles.summarize_title("How do I pick HNSW m?").await.unwrap();
        assert_eq!(title, "Choosing HNSW Parameters");
        assert_eq!(titles.model_name(), "phi4-mini");
    }

    #[tokio::test]
    async fn test_title_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": {"content": "  "}})),
            )
            .mount(&server)
            .await;

        let titles = OllamaTitleSummarizer::new(&config_for(&server)).unwrap();
        assert!(matches!(
            titles.summarize_title("body").await,
            Err(ProviderError::EmptyTitle)
        ));
    }
}
