//! Storage ports: schema management and the conversation vector store.
//!
//! Implementations (PostgreSQL + pgvector) live in vectorlab-infra.

pub mod conversation;
pub mod schema;
pub mod validate;

pub use conversation::ConversationStore;
pub use schema::SchemaManager;
