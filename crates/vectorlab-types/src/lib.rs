//! Shared domain types for vectorlab.
//!
//! Conversation records, search hits, index descriptors, ingestion progress,
//! configuration, and the error enums shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod index;
pub mod ingest;
pub mod search;
