//! Otel Lab: a weather-forecast API instrumented with OpenTelemetry.
//!
//! The service demonstrates wiring one set of metric instruments into
//! several concurrently active export sinks:
//!
//! - **Console**: periodic dump of instrument state to stdout
//! - **Pull/scrape**: Prometheus text exposition at `/metrics`
//! - **Push**: periodic OTLP export to a remote collector
//!
//! Every application request flows through an instrumentation middleware
//! that records into a process-wide counter after the downstream handler
//! completes, whatever the outcome.
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`bootstrap`]: one-shot telemetry initialization
//! - [`observability`]: resource identity, instruments, exporters
//! - [`middleware`]: per-request instrumentation
//! - [`server`]: axum router and server lifecycle
//! - [`service`]: weather-forecast application surface

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions,    // observability::metrics::AppMetrics is fine
    clippy::must_use_candidate,         // Not all functions need #[must_use]
    clippy::missing_errors_doc,         // Error docs can be verbose
    clippy::missing_panics_doc,         // Panic docs can be verbose
    clippy::struct_excessive_bools      // Config structs may have flags
)]

pub mod bootstrap;
pub mod config;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod service;
