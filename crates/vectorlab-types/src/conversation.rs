//! Conversation records as they arrive from an ingestion source.

use serde::{Deserialize, Serialize};

/// A record read from an ingestion source, before embedding.
///
/// Once inserted, the store assigns an immutable `id` and a server-side
/// `created_at`; those only appear on search hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub username: String,
    /// The body the embedding is computed from.
    pub content: String,
    /// Supplied title, if the source carried one.
    pub title: Option<String>,
}

impl SourceRecord {
    pub fn new(username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            content: content.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}
