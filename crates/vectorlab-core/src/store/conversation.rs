//! Conversation vector store trait.

use vectorlab_types::error::StoreError;
use vectorlab_types::search::{DistanceMetric, HybridHit, SimilarHit};

/// Trait for storing conversations with embeddings and searching them.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ConversationStore: Send + Sync {
    /// Persist one conversation and return its store-assigned id.
    ///
    /// Fails with [`StoreError::EmptyContent`] or
    /// [`StoreError::DimensionMismatch`] before anything is written.
    fn insert(
        &self,
        username: &str,
        content: &str,
        embedding: &[f32],
        title: Option<&str>,
    ) -> impl std::future::Future<Output = Result<i64, StoreError>> + Send;

    /// Nearest conversations by the store's metric, ascending distance.
    ///
    /// Returns at most `limit` rows; `limit == 0` is [`StoreError::InvalidLimit`].
    fn search_similar(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<SimilarHit>, StoreError>> + Send;

    /// Full-text matches first (rank descending), then vector-only matches
    /// under the hybrid distance threshold, distance ascending within ties.
    fn search_hybrid(
        &self,
        query_embedding: &[f32],
        query_text: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<HybridHit>, StoreError>> + Send;

    /// Execution plan for `query`. Errors come back as an `"Error: ..."`
    /// string instead of failing.
    fn explain(&self, query: &str) -> impl std::future::Future<Output = String> + Send;

    /// Metric used for ordering and the reported distances.
    fn metric(&self) -> DistanceMetric;

    /// Vector length the table accepts.
    fn dimension(&self) -> usize;
}
