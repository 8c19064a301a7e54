//! PostgreSQL + pgvector storage layer.
//!
//! Vectors travel as text literals (`[0.1,0.2,...]`) cast with `::vector`,
//! so no pgvector client crate is needed.

pub mod conversation;
pub mod pool;
pub mod schema;

pub use conversation::PgConversationStore;
pub use pool::{DatabasePool, connection_target};
pub use schema::PgSchemaManager;

use vectorlab_types::error::StoreError;

/// Map a sqlx error onto the store error kinds callers distinguish.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_) => StoreError::Connection(err.to_string()),
        other => StoreError::Query(other.to_string()),
    }
}

/// pgvector text form of an embedding.
pub(crate) fn vector_literal(embedding: &[f32]) -> String {
    let parts: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_literal() {
        assert_eq!(vector_literal(&[0.5, -1.0, 2.25]), "[0.5,-1,2.25]");
        assert_eq!(vector_literal(&[]), "[]");
    }

    #[test]
    fn test_map_sqlx_error_kinds() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Connection(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Query(_)
        ));
    }
}
