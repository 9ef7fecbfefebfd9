//! Service resource identity.
//!
//! Every exporter attributes its output to the same resource: the service
//! name read from configuration at startup, with a fixed fallback when the
//! configured value is missing or blank. The identity is built once and
//! never mutated.

use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;

use crate::config::Config;

/// Service name used when none is configured.
pub const DEFAULT_SERVICE_NAME: &str = "otel-lab";

/// Immutable identity attached to all exported telemetry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    service_name: String,
}

impl ResourceIdentity {
    /// Build the identity from configuration.
    ///
    /// Total over any configuration state: a missing or blank app name
    /// falls back to [`DEFAULT_SERVICE_NAME`].
    pub fn from_config(config: &Config) -> Self {
        Self::named(&config.app_name)
    }

    /// Build the identity from an explicit name, applying the same
    /// blank-name fallback as [`from_config`](Self::from_config).
    pub fn named(service_name: &str) -> Self {
        let trimmed = service_name.trim();
        let service_name = if trimmed.is_empty() {
            DEFAULT_SERVICE_NAME.to_string()
        } else {
            trimmed.to_string()
        };
        Self { service_name }
    }

    /// The service name carried by all telemetry.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Convert into the SDK resource consumed by console/push exporters.
    pub fn to_resource(&self) -> Resource {
        Resource::new([KeyValue::new("service.name", self.service_name.clone())])
    }
}
