//! Process-wide instrument registry.
//!
//! The registry is the single owner of all metric instruments: every
//! counter is created here exactly once and shared (by cloned handle)
//! with whatever records into it. Registering the same name twice is a
//! bootstrap error, never a runtime condition.
//!
//! A [`CounterHandle`] fans a single `add` out to two backends:
//! - the OpenTelemetry counter, read by the console and OTLP push readers
//! - the Prometheus counter, read by the `/metrics` scrape endpoint
//!
//! Both are internally atomic, so `add` never blocks, never fails from
//! the caller's perspective, and is safe under arbitrary concurrent use.

use opentelemetry::metrics::{Counter, Meter};
use prometheus::{IntCounter, IntGauge, Opts, Registry};

use super::resource::ResourceIdentity;
use super::TelemetryError;

/// Instrumentation scope name for all meters created by this service.
pub const METER_NAME: &str = "otel-lab";

/// Name of the designated per-request counter.
pub const GREETINGS_COUNTER: &str = "greetings.count";

/// Handle to a registered monotonic counter.
///
/// Cloning is cheap and all clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct CounterHandle {
    otel: Counter<u64>,
    prom: IntCounter,
}

impl CounterHandle {
    /// Record `delta` occurrences.
    ///
    /// Non-blocking and infallible; aggregation happens in-memory and any
    /// export trouble is handled out-of-band by the exporter pipeline.
    pub fn add(&self, delta: u64) {
        self.otel.add(delta, &[]);
        self.prom.inc_by(delta);
    }
}

/// Owner of all metric instruments for the process lifetime.
#[derive(Debug)]
pub struct InstrumentRegistry {
    meter: Meter,
    prometheus: Registry,
}

impl InstrumentRegistry {
    /// Create the registry backed by the given meter.
    ///
    /// The scrape surface is attributed to the resource via a `target_info`
    /// sample, so individual counters stay label-free.
    pub fn new(meter: Meter, resource: &ResourceIdentity) -> Result<Self, TelemetryError> {
        let prometheus = Registry::new();

        let target_info = IntGauge::with_opts(
            Opts::new("target_info", "Target metadata")
                .const_label("service_name", resource.service_name()),
        )?;
        target_info.set(1);
        prometheus.register(Box::new(target_info))?;

        Ok(Self { meter, prometheus })
    }

    /// Register a monotonic counter under a process-unique name.
    ///
    /// Returns [`TelemetryError::DuplicateInstrument`] if the name is
    /// already taken; callers must not retry around this.
    pub fn register_counter(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CounterHandle, TelemetryError> {
        let prom = IntCounter::with_opts(Opts::new(sanitize_metric_name(name), description))?;
        self.prometheus
            .register(Box::new(prom.clone()))
            .map_err(|e| match e {
                prometheus::Error::AlreadyReg => {
                    TelemetryError::DuplicateInstrument(name.to_string())
                }
                other => TelemetryError::from(other),
            })?;

        let otel = self
            .meter
            .u64_counter(name.to_string())
            .with_description(description.to_string())
            .with_unit("1")
            .init();

        Ok(CounterHandle { otel, prom })
    }

    /// The Prometheus registry backing the scrape endpoint.
    ///
    /// `prometheus::Registry` clones share state, so the returned value
    /// observes all future `add`s.
    pub fn prometheus_registry(&self) -> Registry {
        self.prometheus.clone()
    }
}

/// Instruments used by the request pipeline.
#[derive(Debug, Clone)]
pub struct AppMetrics {
    /// Incremented once per request that reached the instrumentation
    /// middleware, on every exit path.
    pub greetings: CounterHandle,
}

impl AppMetrics {
    /// Register the designated instruments. Called once during bootstrap.
    pub fn register(registry: &InstrumentRegistry) -> Result<Self, TelemetryError> {
        Ok(Self {
            greetings: registry
                .register_counter(GREETINGS_COUNTER, "Counts the number of greetings.")?,
        })
    }
}

/// Map an OpenTelemetry instrument name onto the Prometheus exposition
/// charset (`greetings.count` becomes `greetings_count`).
fn sanitize_metric_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
