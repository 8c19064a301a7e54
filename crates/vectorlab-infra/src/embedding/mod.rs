//! Embedding and title providers over HTTP.

pub mod factory;
mod http;
pub mod ollama;
pub mod openrouter;

pub use factory::{build_embedder, build_title_summarizer};
pub use ollama::{OllamaEmbedder, OllamaTitleSummarizer};
pub use openrouter::OpenRouterEmbedder;
