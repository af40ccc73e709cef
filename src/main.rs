// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::application::clock::SystemClock;
use crate::application::controller::DashboardController;
use crate::application::scheduler;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_source::HttpDashboardSource;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = load_dashboard_config().context("Failed to load config/dashboard")?;

    // Backend client (infrastructure layer)
    let source = Arc::new(HttpDashboardSource::new(
        &config.backend.base_url,
        config.backend.session_cookie.as_deref(),
        config.backend.timeout(),
    )?);

    // Controller and scheduler (application layer)
    let variant = config.dashboard.variant;
    let mut layout = variant.layout();
    if config.dashboard.legacy_small_path {
        layout = layout.with_legacy_small_path();
    }
    let quiet_hours = config.quiet_hours.window(layout.quiet_hours)?;
    let controller =
        DashboardController::new(variant, layout, quiet_hours, source, Arc::new(SystemClock))?;

    let (commands, rx) = mpsc::channel(4);
    let period = config.refresh.period();
    tokio::spawn(scheduler::run(controller.clone(), period, rx));

    let state = Arc::new(AppState {
        controller,
        commands,
    });
    let router = presentation::router(state);

    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address))?;
    tracing::info!(
        %addr,
        ?variant,
        backend = %config.backend.base_url,
        refresh_secs = period.as_secs(),
        "starting mygrid-dash"
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}
