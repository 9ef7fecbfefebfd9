//! Prometheus HTTP endpoint for metrics scraping.
//!
//! Provides:
//! - `/metrics` - Prometheus metrics endpoint
//! - `/health` - Basic health check
//! - `/ready` - Readiness check
//!
//! The router is merged into the application router outside the request
//! instrumentation middleware, so scraping never perturbs the counters it
//! reports. `Registry::gather` snapshots atomically with respect to
//! concurrent `add`s, giving read-after-write-consistent exposition.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

/// Scrape endpoint state.
#[derive(Clone)]
pub struct PrometheusState {
    registry: Arc<Registry>,
}

impl PrometheusState {
    /// Create a new Prometheus state with the given registry.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Create the Prometheus HTTP router.
pub fn create_router(state: PrometheusState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

/// Handle GET /metrics - Prometheus metrics endpoint.
async fn metrics_handler(State(state): State<PrometheusState>) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain; charset=utf-8")],
                format!("Failed to encode metrics: {e}").into_bytes(),
            )
        }
    }
}

/// Handle GET /health - Basic health check.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handle GET /ready - Readiness check.
async fn ready_handler() -> impl IntoResponse {
    (StatusCode::OK, "READY")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use prometheus::{IntCounter, Opts};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_endpoint() {
        let registry = Registry::new();
        let state = PrometheusState::new(registry);
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_endpoint() {
        let registry = Registry::new();
        let state = PrometheusState::new(registry);
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_exposes_registered_counters() {
        let registry = Registry::new();
        let counter = IntCounter::with_opts(Opts::new("greetings_count", "test counter")).unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc_by(5);

        let app = create_router(PrometheusState::new(registry));
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(
            text.contains("greetings_count 5"),
            "expected counter sample in:\n{text}"
        );
    }
}
