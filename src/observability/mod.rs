//! OpenTelemetry observability infrastructure.
//!
//! Provides:
//! - Resource identity shared by every exporter
//! - The process-wide instrument registry
//! - Exporter pipeline composition (console, scrape, OTLP push)
//! - Prometheus scrape endpoint handlers
//! - Structured tracing setup

pub mod exporters;
pub mod metrics;
pub mod prometheus;
pub mod resource;
pub mod tracing;

use thiserror::Error;

/// Errors raised while configuring the telemetry pipeline.
///
/// All variants are bootstrap-time failures; nothing in the request path
/// surfaces a `TelemetryError`.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured push endpoint is not a valid URI.
    #[error("invalid export endpoint `{endpoint}`: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: http::uri::InvalidUri,
    },

    /// An instrument with the same name already exists.
    #[error("instrument `{0}` is already registered")]
    DuplicateInstrument(String),

    /// The telemetry pipeline was bootstrapped twice.
    #[error("telemetry pipeline is already initialized")]
    AlreadyInitialized,

    /// An exporter could not be constructed.
    #[error("failed to build metrics exporter: {0}")]
    Exporter(#[from] opentelemetry::metrics::MetricsError),

    /// The Prometheus registry rejected an operation.
    #[error(transparent)]
    Prometheus(#[from] ::prometheus::Error),
}
