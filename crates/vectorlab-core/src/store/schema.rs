//! Schema manager trait.

use vectorlab_types::error::StoreError;
use vectorlab_types::index::{IndexDescriptor, IndexSpec, SchemaStats};

/// Owns the vector-capable table and its similarity indexes.
///
/// Every operation is idempotent and safe to call on every startup.
pub trait SchemaManager: Send + Sync {
    /// Create the extension, table and default similarity index if absent.
    fn ensure_schema(&self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Create the alternate index for `spec.kind()` if it does not exist yet.
    ///
    /// The returned descriptor reports whether this call built it.
    fn create_index(
        &self,
        spec: &IndexSpec,
    ) -> impl std::future::Future<Output = Result<IndexDescriptor, StoreError>> + Send;

    /// Drop every known similarity index. No error when none exist.
    fn drop_indexes(&self) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Row count and index sizes; zero rows and zero indexes are fine.
    fn stats(&self) -> impl std::future::Future<Output = Result<SchemaStats, StoreError>> + Send;
}
