//! Test utilities for end-to-end router tests.
//!
//! Provides:
//! - An in-process app wired exactly like the server builds it
//! - Helpers for issuing requests and scraping metrics

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use otel_lab::observability::exporters::{ExporterConfig, ExporterPipeline};
use otel_lab::observability::metrics::{AppMetrics, InstrumentRegistry};
use otel_lab::observability::prometheus::PrometheusState;
use otel_lab::observability::resource::ResourceIdentity;
use otel_lab::server::{build_router, AppState};
use otel_lab::service::WeatherService;

/// An in-process application with its telemetry plumbing.
pub struct TestApp {
    pub app: Router,
    // Held so the provider outlives the test.
    _pipeline: ExporterPipeline,
}

impl TestApp {
    /// Build the app for the given service name, scrape sink only.
    pub fn new(service_name: &str) -> Self {
        let identity = ResourceIdentity::named(service_name);
        let pipeline = ExporterPipeline::compose(
            &identity,
            &[ExporterConfig::pull_scrape()],
            Duration::from_secs(60),
        )
        .expect("pipeline composes");

        let registry = Arc::new(
            InstrumentRegistry::new(pipeline.meter(), &identity).expect("registry builds"),
        );
        let metrics = AppMetrics::register(&registry).expect("instruments register");
        let scrape = pipeline
            .scrape_enabled()
            .then(|| PrometheusState::new(registry.prometheus_registry()));

        let app = build_router(
            Arc::new(AppState {
                weather: WeatherService::new(),
            }),
            metrics,
            scrape,
        );

        Self {
            app,
            _pipeline: pipeline,
        }
    }

    /// Issue a GET and return status plus body text.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let response = self
            .app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .expect("request should complete");
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        (status, String::from_utf8(body.to_vec()).expect("utf8 body"))
    }

    /// Scrape `/metrics` and return the text exposition.
    pub async fn scrape(&self) -> String {
        let (status, body) = self.get("/metrics").await;
        assert_eq!(status, StatusCode::OK, "scrape should succeed");
        body
    }
}

/// Extract a counter value from text exposition output.
pub fn counter_sample(exposition: &str, name: &str) -> Option<u64> {
    exposition.lines().find_map(|line| {
        let value = line.strip_prefix(name)?.trim();
        value.parse().ok()
    })
}
