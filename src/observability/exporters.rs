//! Exporter pipeline composition.
//!
//! Wires the shared resource identity into any subset of three sinks:
//!
//! - **Console**: a `PeriodicReader` over the stdout exporter
//! - **Pull/scrape**: the Prometheus registry served at `/metrics`
//! - **Push**: a `PeriodicReader` over an OTLP exporter (gRPC or
//!   HTTP-binary)
//!
//! Periodic readers run as background tasks on the Tokio runtime,
//! decoupled from request handling; a failed push tick is logged by the
//! SDK and the next tick re-exports current state, so nothing queues.
//! With no periodic sink configured a `ManualReader` still backs the
//! provider, keeping instrument recording well-defined.

use std::time::Duration;

use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry_sdk::metrics::reader::DefaultTemporalitySelector;
use opentelemetry_sdk::metrics::{ManualReader, PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::runtime;

use crate::config::{Config, OtlpProtocol};

use super::metrics::METER_NAME;
use super::resource::ResourceIdentity;
use super::TelemetryError;

/// Default OTLP collector endpoint (HTTP-binary port).
pub const DEFAULT_OTLP_ENDPOINT: &str = "http://localhost:4318";

/// The kind of sink an [`ExporterConfig`] activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExporterKind {
    /// Periodic dump of instrument state to stdout.
    Console,
    /// Prometheus text exposition served on demand at `/metrics`.
    PullScrape,
    /// Periodic batched transmission to a remote OTLP collector.
    PushOtlp,
}

/// One active sink, built from configuration and immutable thereafter.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub kind: ExporterKind,
    /// Remote endpoint; only meaningful for [`ExporterKind::PushOtlp`].
    pub endpoint: Option<String>,
    /// Wire protocol; only meaningful for [`ExporterKind::PushOtlp`].
    pub protocol: Option<OtlpProtocol>,
}

impl ExporterConfig {
    /// Console sink.
    pub fn console() -> Self {
        Self {
            kind: ExporterKind::Console,
            endpoint: None,
            protocol: None,
        }
    }

    /// Pull/scrape sink.
    pub fn pull_scrape() -> Self {
        Self {
            kind: ExporterKind::PullScrape,
            endpoint: None,
            protocol: None,
        }
    }

    /// Push sink targeting `endpoint` over `protocol`.
    pub fn push_otlp(endpoint: &str, protocol: OtlpProtocol) -> Self {
        Self {
            kind: ExporterKind::PushOtlp,
            endpoint: Some(endpoint.to_string()),
            protocol: Some(protocol),
        }
    }

    /// Derive the active sink set from configuration.
    ///
    /// The push sink is active only when an endpoint is configured;
    /// console is the default otherwise. The scrape sink follows its own
    /// enable flag.
    pub fn from_config(config: &Config) -> Vec<Self> {
        let mut configs = Vec::new();
        if config.metrics_enabled {
            configs.push(Self::pull_scrape());
        }
        match &config.otel_endpoint {
            Some(endpoint) => configs.push(Self::push_otlp(endpoint, config.otel_protocol)),
            None => configs.push(Self::console()),
        }
        configs
    }
}

/// The composed set of concurrently active exporters.
///
/// Owns the SDK meter provider; dropping the pipeline without calling
/// [`shutdown`](Self::shutdown) leaves at most one export interval of
/// data unflushed.
#[derive(Debug)]
pub struct ExporterPipeline {
    provider: SdkMeterProvider,
    scrape_enabled: bool,
}

impl ExporterPipeline {
    /// Compose the configured sinks over the shared resource identity.
    ///
    /// Fails fast on an unparsable push endpoint or an exporter that
    /// cannot be constructed; tolerates any subset of sinks, including
    /// none.
    pub fn compose(
        resource: &ResourceIdentity,
        configs: &[ExporterConfig],
        interval: Duration,
    ) -> Result<Self, TelemetryError> {
        let mut builder = SdkMeterProvider::builder().with_resource(resource.to_resource());
        let mut scrape_enabled = false;
        let mut periodic_readers = 0;

        for config in configs {
            match config.kind {
                ExporterKind::Console => {
                    let exporter = opentelemetry_stdout::MetricsExporter::default();
                    builder = builder.with_reader(
                        PeriodicReader::builder(exporter, runtime::Tokio)
                            .with_interval(interval)
                            .build(),
                    );
                    periodic_readers += 1;
                    tracing::info!(interval_secs = interval.as_secs(), "Console exporter configured");
                }
                ExporterKind::PullScrape => {
                    scrape_enabled = true;
                }
                ExporterKind::PushOtlp => {
                    let endpoint = config
                        .endpoint
                        .as_deref()
                        .unwrap_or(DEFAULT_OTLP_ENDPOINT)
                        .to_string();
                    let protocol = config.protocol.unwrap_or(OtlpProtocol::HttpBinary);
                    endpoint
                        .parse::<http::Uri>()
                        .map_err(|source| TelemetryError::InvalidEndpoint {
                            endpoint: endpoint.clone(),
                            source,
                        })?;

                    let exporter = build_otlp_exporter(&endpoint, protocol)?;
                    builder = builder.with_reader(
                        PeriodicReader::builder(exporter, runtime::Tokio)
                            .with_interval(interval)
                            .build(),
                    );
                    periodic_readers += 1;
                    tracing::info!(endpoint, ?protocol, "OTLP push exporter configured");
                }
            }
        }

        // Recording without any periodic reader still needs a provider
        // that aggregates, not a no-op one.
        if periodic_readers == 0 {
            builder = builder.with_reader(ManualReader::builder().build());
        }

        Ok(Self {
            provider: builder.build(),
            scrape_enabled,
        })
    }

    /// The meter provider backing all instruments.
    pub fn provider(&self) -> &SdkMeterProvider {
        &self.provider
    }

    /// Obtain the service meter from this pipeline's provider.
    pub fn meter(&self) -> Meter {
        self.provider.meter(METER_NAME)
    }

    /// Whether the pull/scrape sink was configured.
    pub fn scrape_enabled(&self) -> bool {
        self.scrape_enabled
    }

    /// Flush and stop all background export activity.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        self.provider.shutdown()?;
        Ok(())
    }
}

/// Build the OTLP metrics exporter for the selected wire protocol.
fn build_otlp_exporter(
    endpoint: &str,
    protocol: OtlpProtocol,
) -> Result<opentelemetry_otlp::MetricsExporter, TelemetryError> {
    use opentelemetry_otlp::{Protocol, WithExportConfig};

    let temporality = Box::new(DefaultTemporalitySelector::new());
    let exporter = match protocol {
        OtlpProtocol::Grpc => opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint)
            .with_protocol(Protocol::Grpc)
            .build_metrics_exporter(temporality)?,
        OtlpProtocol::HttpBinary => opentelemetry_otlp::new_exporter()
            .http()
            .with_endpoint(endpoint)
            .with_protocol(Protocol::HttpBinary)
            .build_metrics_exporter(temporality)?,
    };
    Ok(exporter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_uses_console_and_scrape() {
        let config = Config::test_config("svc-test");
        let configs = ExporterConfig::from_config(&config);

        let kinds: Vec<_> = configs.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ExporterKind::Console), "console is the default sink");
        assert!(kinds.contains(&ExporterKind::PullScrape));
        assert!(!kinds.contains(&ExporterKind::PushOtlp));
    }

    #[test]
    fn test_configured_endpoint_replaces_console() {
        let mut config = Config::test_config("svc-test");
        config.otel_endpoint = Some("http://collector:4318".into());
        let configs = ExporterConfig::from_config(&config);

        let kinds: Vec<_> = configs.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ExporterKind::PushOtlp));
        assert!(!kinds.contains(&ExporterKind::Console));
    }

    #[test]
    fn test_compose_with_no_sinks_succeeds() {
        let pipeline = ExporterPipeline::compose(
            &ResourceIdentity::named("svc-test"),
            &[],
            Duration::from_secs(1),
        )
        .expect("empty sink set is valid");
        assert!(!pipeline.scrape_enabled());
    }

    #[test]
    fn test_compose_scrape_only() {
        let pipeline = ExporterPipeline::compose(
            &ResourceIdentity::named("svc-test"),
            &[ExporterConfig::pull_scrape()],
            Duration::from_secs(1),
        )
        .expect("scrape-only is valid");
        assert!(pipeline.scrape_enabled());
    }

    #[tokio::test]
    async fn test_compose_rejects_invalid_endpoint() {
        let err = ExporterPipeline::compose(
            &ResourceIdentity::named("svc-test"),
            &[ExporterConfig::push_otlp("not a uri at all", OtlpProtocol::HttpBinary)],
            Duration::from_secs(1),
        )
        .expect_err("invalid endpoint must fail composition");
        assert!(matches!(err, TelemetryError::InvalidEndpoint { .. }));
    }

    /// Multi-threaded runtime so provider shutdown can block while the
    /// periodic reader task drains.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_compose_push_with_valid_endpoint() {
        let pipeline = ExporterPipeline::compose(
            &ResourceIdentity::named("svc-test"),
            &[ExporterConfig::push_otlp("http://localhost:4318", OtlpProtocol::HttpBinary)],
            Duration::from_secs(60),
        )
        .expect("valid endpoint composes");
        // No collector is listening; shutdown may fail to flush, which is
        // an export error, not a composition error.
        let _ = pipeline.shutdown();
    }
}
