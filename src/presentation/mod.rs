pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dashboard_events, get_dashboard, get_widget, health_check, undim,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/widgets/:id", get(get_widget))
        .route("/dashboard/events", get(dashboard_events))
        .route("/dashboard/undim", post(undim))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
