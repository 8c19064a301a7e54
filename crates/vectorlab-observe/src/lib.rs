//! Observability setup for vectorlab: structured logging plus an optional
//! OpenTelemetry bridge.

pub mod tracing_setup;

pub use tracing_setup::{
    TracingOptions, bootstrap_logging, init_tracing, shutdown_tracing, verbosity_filter,
};
