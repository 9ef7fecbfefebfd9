//! One-shot telemetry bootstrap.
//!
//! Orders construction so every component receives already-built
//! dependencies: resource identity, then the exporter pipeline (the SDK
//! attaches readers at provider construction, so the composer runs
//! first), then the instrument registry and the designated instruments.
//! Middleware installation and server start follow in `main`.
//!
//! Bootstrapping is valid at most once per process; a second call is
//! rejected rather than silently duplicating sinks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use opentelemetry::global;

use crate::config::Config;
use crate::observability::exporters::{ExporterConfig, ExporterPipeline};
use crate::observability::metrics::{AppMetrics, InstrumentRegistry};
use crate::observability::resource::ResourceIdentity;
use crate::observability::TelemetryError;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// The fully bootstrapped telemetry pipeline.
#[derive(Debug)]
pub struct Telemetry {
    resource: ResourceIdentity,
    pipeline: ExporterPipeline,
    registry: Arc<InstrumentRegistry>,
    metrics: AppMetrics,
}

impl Telemetry {
    /// Bootstrap telemetry from configuration.
    ///
    /// Returns [`TelemetryError::AlreadyInitialized`] on a second call.
    /// On failure the guard is released so a corrected configuration can
    /// be retried within the same process.
    pub fn init(config: &Config) -> Result<Self, TelemetryError> {
        if INITIALIZED.swap(true, Ordering::SeqCst) {
            return Err(TelemetryError::AlreadyInitialized);
        }
        Self::build(config).inspect_err(|_| INITIALIZED.store(false, Ordering::SeqCst))
    }

    fn build(config: &Config) -> Result<Self, TelemetryError> {
        let resource = ResourceIdentity::from_config(config);
        let configs = ExporterConfig::from_config(config);
        let pipeline = ExporterPipeline::compose(
            &resource,
            &configs,
            Duration::from_secs(config.export_interval_secs),
        )?;
        global::set_meter_provider(pipeline.provider().clone());

        let registry = Arc::new(InstrumentRegistry::new(pipeline.meter(), &resource)?);
        let metrics = AppMetrics::register(&registry)?;

        tracing::info!(
            service = resource.service_name(),
            sinks = configs.len(),
            "Telemetry pipeline initialized"
        );

        Ok(Self {
            resource,
            pipeline,
            registry,
            metrics,
        })
    }

    /// The service identity attached to all telemetry.
    pub fn resource(&self) -> &ResourceIdentity {
        &self.resource
    }

    /// The process-wide instrument registry.
    pub fn registry(&self) -> &Arc<InstrumentRegistry> {
        &self.registry
    }

    /// The instruments recorded by the request pipeline.
    pub fn metrics(&self) -> &AppMetrics {
        &self.metrics
    }

    /// Whether the scrape endpoint should be mounted.
    pub fn scrape_enabled(&self) -> bool {
        self.pipeline.scrape_enabled()
    }

    /// Flush and stop background export activity.
    pub fn shutdown(&self) -> Result<(), TelemetryError> {
        self.pipeline.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single test covering the whole bootstrap lifecycle, since the
    /// process-wide guard would make separate tests order-dependent.
    /// Multi-threaded runtime so provider shutdown can block while the
    /// periodic reader task drains.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_bootstrap_lifecycle() {
        // A bad endpoint fails fast and releases the guard.
        let mut bad = Config::test_config("svc-boot");
        bad.otel_endpoint = Some("::not a uri::".into());
        let err = Telemetry::init(&bad).expect_err("invalid endpoint must fail bootstrap");
        assert!(matches!(err, TelemetryError::InvalidEndpoint { .. }));

        // Default configuration (no endpoint) bootstraps with the console
        // sink and the scrape endpoint.
        let config = Config::test_config("svc-boot");
        let telemetry = Telemetry::init(&config).expect("default config bootstraps");
        assert_eq!(telemetry.resource().service_name(), "svc-boot");
        assert!(telemetry.scrape_enabled());

        // Recording through the designated counter is visible on the
        // scrape surface.
        telemetry.metrics().greetings.add(1);
        let families = telemetry.registry().prometheus_registry().gather();
        let greetings = families
            .iter()
            .find(|f| f.get_name() == "greetings_count")
            .expect("counter registered");
        assert_eq!(greetings.get_metric()[0].get_counter().get_value() as u64, 1);

        // A second bootstrap is a configuration error.
        let err = Telemetry::init(&config).expect_err("double bootstrap must fail");
        assert!(matches!(err, TelemetryError::AlreadyInitialized));

        telemetry.shutdown().expect("shutdown flushes cleanly");
    }
}
