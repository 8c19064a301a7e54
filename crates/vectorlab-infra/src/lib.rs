//! Infrastructure layer for vectorlab.
//!
//! Contains implementations of the traits defined in `vectorlab-core`:
//! PostgreSQL/pgvector storage, Ollama and OpenRouter embedding providers,
//! the CSV record source, and the config file loader.

pub mod config;
pub mod embedding;
pub mod pg;
pub mod source;
