//! Hound - Main Entry Point

use alerting::StatusBoard;
use anyhow::Context;
use api::rate_limit::RateLimitConfig;
use api::settings::{config_path, Settings};
use api::supervisor::{CollectionPlan, Supervisor};
use api::{init_logging, install_metrics_recorder, serve, AppState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = config_path();
    let settings = Settings::from_file(&config_path)
        .with_context(|| format!("loading settings from {}", config_path))?;

    init_logging(&settings.logging)?;
    info!("=== Hound v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = install_metrics_recorder().context("installing Prometheus recorder")?;

    let plan = CollectionPlan::from_settings(&settings)?;
    info!(
        "Watching {} alerts every {}s",
        plan.alerts.len(),
        settings.check_interval_secs
    );

    let board = StatusBoard::default();
    let mut supervisor = Supervisor::new(board.clone());
    supervisor.start(plan).await;

    let listener = tokio::net::TcpListener::bind(&settings.http.bind_address)
        .await
        .with_context(|| format!("binding {}", settings.http.bind_address))?;

    let state = Arc::new(AppState::new(
        board,
        Some(metrics),
        Some(settings.graphite.base_url.clone()),
    ));
    let server_shutdown = CancellationToken::new();
    let server = tokio::spawn(serve(
        listener,
        state,
        RateLimitConfig::from(&settings.http),
        server_shutdown.clone(),
    ));

    supervisor.supervise(&config_path).await;

    supervisor.stop().await;
    server_shutdown.cancel();
    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Status API failed: {:#}", e),
        Err(e) => error!("Status API task panicked: {}", e),
    }

    info!("Hound stopped");
    Ok(())
}
