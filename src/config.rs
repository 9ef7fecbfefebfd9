//! Configuration parsing for the Otel Lab server.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Sensible defaults for quick start
//!
//! Every key is optional; an unset push endpoint means the console sink
//! is used instead. A malformed protocol selector is rejected at parse
//! time, before any server socket is opened.

use clap::{Parser, ValueEnum};

/// Wire protocol for the OTLP push exporter.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtlpProtocol {
    /// Binary protobuf over HTTP (collector default port 4318).
    HttpBinary,
    /// gRPC (collector default port 4317).
    Grpc,
}

/// Otel Lab: a weather-forecast API with multi-sink telemetry export.
#[derive(Parser, Debug, Clone)]
#[command(name = "otel-lab")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "OTEL_LAB_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "OTEL_LAB_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Service name attached to all exported telemetry
    #[arg(long, env = "OTEL_LAB_APP_NAME", default_value = "otel-lab")]
    pub app_name: String,

    /// OpenTelemetry collector endpoint for push export (optional;
    /// console export is used when unset)
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otel_endpoint: Option<String>,

    /// Wire protocol for push export
    #[arg(
        long,
        env = "OTEL_EXPORTER_OTLP_PROTOCOL",
        value_enum,
        default_value_t = OtlpProtocol::HttpBinary
    )]
    pub otel_protocol: OtlpProtocol,

    /// Interval in seconds between console/push export ticks
    #[arg(long, env = "OTEL_LAB_EXPORT_INTERVAL_SECS", default_value_t = 10)]
    pub export_interval_secs: u64,

    /// Serve the Prometheus scrape endpoint at /metrics
    #[arg(
        long,
        env = "OTEL_LAB_METRICS_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub metrics_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration for testing, with the given app name.
    #[cfg(test)]
    pub fn test_config(app_name: &str) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0, // Random port
            app_name: app_name.into(),
            otel_endpoint: None,
            otel_protocol: OtlpProtocol::HttpBinary,
            export_interval_secs: 1,
            metrics_enabled: true,
            log_level: "debug".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            app_name: "otel-lab".into(),
            otel_endpoint: None,
            otel_protocol: OtlpProtocol::HttpBinary,
            export_interval_secs: 10,
            metrics_enabled: true,
            log_level: "info".into(),
        }
    }
}
