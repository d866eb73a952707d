//! Alert Routes

use alerting::{AlertSnapshot, CycleStats, Status};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use metric_source::{graph_url, GraphSpan};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Query parameters for the alerts endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Filter by status (`ok`, `failed`, `error`, any case)
    pub status: Option<String>,
}

/// One alert with links to its graphs
#[derive(Debug, Serialize)]
pub struct AlertView {
    #[serde(flatten)]
    pub alert: AlertSnapshot,
    pub daily_graph_url: Option<String>,
    pub weekly_graph_url: Option<String>,
}

impl AlertView {
    fn new(alert: AlertSnapshot, graphite_base: Option<&str>) -> Self {
        let graph = |span| {
            graphite_base.map(|base| graph_url(base, &alert.metric, alert.threshold, span))
        };
        Self {
            daily_graph_url: graph(GraphSpan::Daily),
            weekly_graph_url: graph(GraphSpan::Weekly),
            alert,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
    pub data: Vec<AlertView>,
    pub count: usize,
    pub failing_count: usize,
    pub last_cycle: Option<CycleStats>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// List alerts in collection order
pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AlertQuery>,
) -> Json<AlertsResponse> {
    let board = state.board.snapshot();
    let graphite_base = state.graphite_base.as_deref();

    let failing_count = board
        .alerts
        .iter()
        .filter(|a| a.status != Status::Ok)
        .count();

    let data: Vec<AlertView> = board
        .alerts
        .into_iter()
        .filter(|a| match &params.status {
            Some(wanted) => a.status.as_str().eq_ignore_ascii_case(wanted),
            None => true,
        })
        .map(|a| AlertView::new(a, graphite_base))
        .collect();

    Json(AlertsResponse {
        count: data.len(),
        failing_count,
        data,
        last_cycle: board.last_cycle,
        updated_at: board.updated_at,
    })
}

/// Get one alert by fingerprint
pub async fn get_alert(
    State(state): State<Arc<AppState>>,
    Path(fingerprint): Path<String>,
) -> impl IntoResponse {
    match state.board.get(&fingerprint) {
        Some(alert) => (
            StatusCode::OK,
            Json(AlertView::new(alert, state.graphite_base.as_deref())),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no alert with fingerprint {}", fingerprint),
            }),
        )
            .into_response(),
    }
}
