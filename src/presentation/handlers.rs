// HTTP request handlers
use crate::application::scheduler::Command;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::Stream;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current page, widgets and dim state
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.controller.snapshot().await)
}

pub async fn get_widget(Path(id): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    match state.controller.widget(&id).await {
        Some(widget) => Json(widget).into_response(),
        None => (StatusCode::NOT_FOUND, format!("unknown widget {}", id)).into_response(),
    }
}

/// Manual override of the quiet-hours dimming
pub async fn undim(State(state): State<Arc<AppState>>) -> StatusCode {
    match state.commands.try_send(Command::Undim) {
        Ok(()) => StatusCode::ACCEPTED,
        // an undim is already queued
        Err(TrySendError::Full(_)) => StatusCode::ACCEPTED,
        Err(TrySendError::Closed(_)) => {
            tracing::warn!("undim requested but the scheduler is not running");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Streams a snapshot now and after every change
pub async fn dashboard_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let controller = state.controller.clone();
    let mut revisions = controller.subscribe();

    let stream = async_stream::stream! {
        loop {
            revisions.borrow_and_update();
            let snapshot = controller.snapshot().await;
            match Event::default()
                .event("snapshot")
                .id(snapshot.revision.to_string())
                .json_data(&snapshot)
            {
                Ok(event) => yield Ok(event),
                Err(e) => tracing::error!("Failed to encode snapshot: {}", e),
            }

            if revisions.changed().await.is_err() {
                break;
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
