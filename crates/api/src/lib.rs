//! Hound Status API
//!
//! Settings, collection supervision, and the read-only HTTP surface over the
//! status board: health, alert listing, alert lookup, Prometheus scrape.

use alerting::StatusBoard;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod rate_limit;
pub mod settings;
pub mod supervisor;

mod routes {
    pub mod alerts;
}

use rate_limit::{create_governor_config, RateLimitConfig};
use settings::{LogFormat, LoggingSettings};

/// Application state shared across handlers
pub struct AppState {
    /// Latest published alert snapshots
    pub board: StatusBoard,
    /// Prometheus scrape handle, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Graphite render endpoint used for graph links
    pub graphite_base: Option<String>,
    pub version: String,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(
        board: StatusBoard,
        metrics: Option<PrometheusHandle>,
        graphite_base: Option<String>,
    ) -> Self {
        Self {
            board,
            metrics,
            graphite_base,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub alert_count: usize,
    pub failing_count: usize,
    /// When the evaluation loop last published, if ever
    pub last_update: Option<DateTime<Utc>>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/alerts", get(routes::alerts::list_alerts))
        .route("/api/v1/alerts/:fingerprint", get(routes::alerts::get_alert))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let board = state.board.snapshot();
    let failing_count = board
        .alerts
        .iter()
        .filter(|a| a.status != alerting::Status::Ok)
        .count();

    Json(HealthResponse {
        status: if board.updated_at.is_some() {
            "healthy".to_string()
        } else {
            "starting".to_string()
        },
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        alert_count: board.alerts.len(),
        failing_count,
        last_update: board.updated_at,
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {}", e))
}

/// Install the global Prometheus recorder backing `/metrics`
pub fn install_metrics_recorder() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Serve the status API on `listener` until `shutdown` fires
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    rate: RateLimitConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let mut app = create_router(state);
    match create_governor_config(&rate) {
        Some(config) => app = app.layer(GovernorLayer { config }),
        None => warn!("Invalid rate limit {:?}, serving without one", rate),
    }

    info!("Status API listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await?;

    info!("Status API stopped");
    Ok(())
}
