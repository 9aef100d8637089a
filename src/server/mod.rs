// Server module
// HTTP boundary: POST /chat and GET /health


use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::assistant::Assistant;

/// What the HTTP layer needs from the answering core
pub trait Responder: Send + Sync + 'static {
    fn answer(&self, message: &str) -> String;

    fn index_loaded(&self) -> bool;

    fn remote_enabled(&self) -> bool;
}

impl Responder for Assistant {
    #[inline]
    fn answer(&self, message: &str) -> String {
        Self::answer(self, message)
    }

    #[inline]
    fn index_loaded(&self) -> bool {
        Self::index_loaded(self)
    }

    #[inline]
    fn remote_enabled(&self) -> bool {
        Self::remote_enabled(self)
    }
}

#[derive(Clone)]
pub struct AppState {
    responder: Arc<dyn Responder>,
}

impl AppState {
    #[inline]
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self { responder }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub index_loaded: bool,
    pub remote_enabled: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Request failures visible to HTTP clients
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No message provided")]
    EmptyMessage,
    #[error("No message provided")]
    InvalidBody(#[source] JsonRejection),
    #[error("Failed to generate a response")]
    Worker(#[source] tokio::task::JoinError),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::EmptyMessage | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router
#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve on `listener` until Ctrl-C
#[inline]
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener
        .local_addr()
        .context("Failed to read listener address")?;
    info!("Chat server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
        .context("Chat server stopped unexpectedly")?;

    info!("Chat server shut down");
    Ok(())
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejected chat body: {}", rejection.body_text());
        ChatError::InvalidBody(rejection)
    })?;

    let message = request
        .message
        .filter(|message| !message.is_empty())
        .ok_or(ChatError::EmptyMessage)?;

    let responder = Arc::clone(&state.responder);
    let response = tokio::task::spawn_blocking(move || responder.answer(&message))
        .await
        .map_err(|e| {
            error!("Chat worker failed: {}", e);
            ChatError::Worker(e)
        })?;

    Ok(Json(ChatResponse { response }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        index_loaded: state.responder.index_loaded(),
        remote_enabled: state.responder.remote_enabled(),
    })
}
