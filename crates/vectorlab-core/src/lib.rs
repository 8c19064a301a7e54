//! Provider/store traits and the ingestion pipeline for vectorlab.
//!
//! This crate defines the "ports" the infrastructure layer implements
//! (embedding providers, title summarizers, schema manager, conversation
//! store) and the orchestration that drives them. It depends only on
//! `vectorlab-types` -- never on `vectorlab-infra` or any database/HTTP crate.

pub mod embedding;
pub mod ingest;
pub mod store;
