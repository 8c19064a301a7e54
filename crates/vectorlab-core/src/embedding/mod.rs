//! Embedding and title generation ports.

pub mod box_embedder;
pub mod embedder;
pub mod title;

pub use box_embedder::BoxEmbedder;
pub use embedder::Embedder;
pub use title::{BoxTitleSummarizer, TitleSummarizer};
