//! HTTP front end
//!
//! `POST /compile` verifies a submission, `GET /health` reports liveness.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use casejudge::{ErrorKind, VerificationRequest, Verifier};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

/// Name reported by the health check
const SERVICE_NAME: &str = "compiler_service";

pub fn router(verifier: Arc<Verifier>) -> Router {
    Router::new()
        .route("/compile", post(compile))
        .route("/health", get(health))
        .with_state(verifier)
}

pub async fn serve(verifier: Verifier, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router(Arc::new(verifier)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

/// POST /compile - verify a submission
async fn compile(
    State(verifier): State<Arc<Verifier>>,
    Json(request): Json<VerificationRequest>,
) -> Response {
    let verdict = verifier.verify(&request).await;
    let status = match verdict.error {
        Some(ErrorKind::MissingCode | ErrorKind::InvalidLimits) => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };
    (status, Json(verdict)).into_response()
}

/// GET /health - liveness check
async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": SERVICE_NAME}))
}
