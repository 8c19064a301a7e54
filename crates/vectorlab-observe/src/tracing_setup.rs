//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use vectorlab_observe::{TracingOptions, init_tracing, verbosity_filter};
//!
//! init_tracing(&TracingOptions {
//!     filter: verbosity_filter(1, false).to_string(),
//!     enable_otel: false,
//!     service_name: "vectorlab".to_string(),
//! })
//! .unwrap();
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// How the global subscriber is built.
#[derive(Debug, Clone)]
pub struct TracingOptions {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Bridge spans to OpenTelemetry (stdout exporter).
    pub enable_otel: bool,
    /// Tracer name reported to OpenTelemetry.
    pub service_name: String,
}

/// Filter directives for the CLI's `-v` count and `--quiet` flag.
///
/// `warn` by default, `info` with the vectorlab crates at `debug` for `-v`, `trace` from `-vv`.
/// `--quiet` keeps only errors.
pub fn verbosity_filter(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info,vlab=debug,vectorlab_core=debug,vectorlab_infra=debug",
        _ => "trace",
    }
}

/// Scoped warn-level stderr subscriber for work done before
/// [`init_tracing`], such as loading the config file that decides whether
/// OpenTelemetry is on. Dropping the guard removes it.
pub fn bootstrap_logging() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .with_target(false)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Initialize the global tracing subscriber.
///
/// - Always installs a `fmt` layer on stderr (stdout is reserved for command
///   output, including `--json`).
/// - When `enable_otel` is set, additionally bridges tracing spans to
///   OpenTelemetry using a stdout exporter.
/// - `RUST_LOG` takes precedence over `options.filter`.
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is
/// already set.
pub fn init_tracing(options: &TracingOptions) -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_span_events(FmtSpan::CLOSE);

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&options.filter)?,
    };

    if options.enable_otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer(options.service_name.clone());
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// No-op when OTel was not enabled.
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(verbosity_filter(0, false), "warn");
        assert!(verbosity_filter(1, false).contains("vectorlab_core=debug"));
        assert_eq!(verbosity_filter(2, false), "trace");
        assert_eq!(verbosity_filter(5, false), "trace");
        assert_eq!(verbosity_filter(2, true), "error");
    }

    #[test]
    fn test_filters_parse() {
        for verbose in 0..3 {
            assert!(EnvFilter::try_new(verbosity_filter(verbose, false)).is_ok());
        }
    }

    #[test]
    fn test_shutdown_without_init_is_noop() {
        shutdown_tracing();
    }
}
