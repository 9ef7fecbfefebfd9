//! Otel Lab: an instrumented weather-forecast API.
//!
//! # Usage
//!
//! ```bash
//! otel-lab --port 8080 --app-name svc-a --log-level info
//! ```
//!
//! Environment variables can also be used:
//! - `OTEL_LAB_PORT`: Port to listen on
//! - `OTEL_LAB_APP_NAME`: Service name attached to exported telemetry
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint for push export
//! - `OTEL_EXPORTER_OTLP_PROTOCOL`: `http-binary` or `grpc`
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use anyhow::Context;
use otel_lab::bootstrap::Telemetry;
use otel_lab::config::Config;
use otel_lab::observability::tracing::init_tracing;
use otel_lab::server::run_server;
use tokio::sync::watch;

/// Print startup banner with version and configuration.
fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        r#"
   ___  _       _   _          _
  / _ \| |_ ___| | | |    __ _| |__
 | | | | __/ _ \ | | |   / _` | '_ \
 | |_| | ||  __/ | | |__| (_| | |_) |
  \___/ \__\___|_| |_____\__,_|_.__/

  Otel Lab v{} - Instrumented Weather API

  Configuration:
    Address:    {}:{}
    Service:    {}
    Push:       {}
    Scrape:     {}
    Log Level:  {}

  Press Ctrl+C to shutdown gracefully.
"#,
        version,
        config.host,
        config.port,
        config.app_name,
        config.otel_endpoint.as_deref().unwrap_or("disabled (console)"),
        if config.metrics_enabled { "/metrics" } else { "disabled" },
        config.log_level
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Bootstrap the telemetry pipeline; a configuration error here must
    // halt startup before any request is accepted
    let telemetry = Telemetry::init(&config).context("telemetry bootstrap failed")?;

    // Print startup banner
    print_banner(&config);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        // Wait for SIGTERM or SIGINT (Ctrl+C)
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            ctrl_c.await.expect("failed to listen for ctrl+c");
            tracing::info!("Received Ctrl+C, initiating shutdown...");
        }

        // Signal shutdown
        let _ = shutdown_tx_clone.send(true);
    });

    // Run the server
    run_server(&config, &telemetry, shutdown_rx).await?;

    // Flush any telemetry recorded in the last export interval
    telemetry
        .shutdown()
        .context("telemetry pipeline shutdown failed")?;

    tracing::info!("Otel Lab shutdown complete");
    Ok(())
}
