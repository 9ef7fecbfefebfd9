//! HTTP server setup and lifecycle.
//!
//! Builds the axum router with:
//! - Application routes behind the instrumentation middleware
//! - CORS and request-span layers
//! - The scrape/health routes mounted outside the instrumented stack
//! - Graceful shutdown support

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bootstrap::Telemetry;
use crate::config::Config;
use crate::middleware::track_requests;
use crate::observability::metrics::AppMetrics;
use crate::observability::prometheus::{create_router as create_metrics_router, PrometheusState};
use crate::service::{WeatherForecast, WeatherService};

/// State shared across application handlers.
pub struct AppState {
    pub weather: WeatherService,
}

/// Build the application router.
///
/// Routes added here are wrapped by the instrumentation middleware; the
/// scrape router is merged afterwards so reading `/metrics` never
/// records into the counters it reports. The fallback is installed
/// explicitly before layering: merging would otherwise replace it with
/// an uninstrumented default, and unmatched requests must still count.
pub fn build_router(
    state: Arc<AppState>,
    metrics: AppMetrics,
    scrape: Option<PrometheusState>,
) -> Router {
    let mut app = Router::new()
        .route("/weatherforecast", get(get_weather_forecast))
        .fallback(not_found)
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(metrics, track_requests))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    if let Some(scrape_state) = scrape {
        app = app.merge(create_metrics_router(scrape_state));
    }
    app
}

/// Fallback for unmatched routes; instrumented like every other
/// application route.
async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Handle GET /weatherforecast.
async fn get_weather_forecast(State(state): State<Arc<AppState>>) -> Json<Vec<WeatherForecast>> {
    tracing::info!("Retrieving weather forecast");
    Json(state.weather.forecasts(5))
}

/// Run the HTTP server until the shutdown signal fires.
pub async fn run_server(
    config: &Config,
    telemetry: &Telemetry,
    mut shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let state = Arc::new(AppState {
        weather: WeatherService::new(),
    });
    let scrape = telemetry
        .scrape_enabled()
        .then(|| PrometheusState::new(telemetry.registry().prometheus_registry()));
    let app = build_router(state, telemetry.metrics().clone(), scrape);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            tracing::info!("Shutdown signal received, stopping server");
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
