//! Build the configured providers, type-erased for the rest of the app.

use tracing::info;

use vectorlab_core::embedding::{BoxEmbedder, BoxTitleSummarizer};
use vectorlab_types::config::{AppConfig, EmbeddingBackend};
use vectorlab_types::error::ConfigError;

use super::ollama::{OllamaEmbedder, OllamaTitleSummarizer};
use super::openrouter::OpenRouterEmbedder;

/// Construct the embedder selected by `embedding.backend`.
///
/// There is no fallback between backends: their vector spaces differ.
pub fn build_embedder(config: &AppConfig) -> Result<BoxEmbedder, ConfigError> {
    let dimension = config.embedding.dimension;
    let embedder = match config.embedding.backend {
        EmbeddingBackend::Ollama => BoxEmbedder::new(OllamaEmbedder::new(&config.ollama, dimension)?),
        EmbeddingBackend::OpenRouter => {
            BoxEmbedder::new(OpenRouterEmbedder::new(&config.openrouter, dimension)?)
        }
    };
    info!(
        backend = %config.embedding.backend,
        dimension,
        "embedding provider ready"
    );
    Ok(embedder)
}

/// Titles always come from the local Ollama chat model.
pub fn build_title_summarizer(config: &AppConfig) -> Result<BoxTitleSummarizer, ConfigError> {
    Ok(BoxTitleSummarizer::new(OllamaTitleSummarizer::new(
        &config.ollama,
    )?))
}
