//! Ingestion: read records, embed them, and write them to the store.

pub mod pipeline;

pub use pipeline::{DEFAULT_BATCH_SIZE, IngestPipeline};
