//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::types::{ErrorResponse, HealthResponse, RunRequest, RunResponse};
use super::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/static/*path", get(serve_static))
        .route("/health", get(health))
        .route("/run", post(run_dialogue))
        .with_state(state)
}

async fn serve_index() -> Response {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => AppError::NotFound("index.html not embedded".to_string()).into_response(),
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// ============================================================
// Dialogue Runs
// ============================================================

async fn run_dialogue(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RunResponse>, AppError> {
    let exchanges = RunRequest::from_body(&body).exchange_count();

    // One run at a time; later requests wait their turn
    let guard = state.run_lock.clone().lock_owned().await;

    // The run lives in its own task so a dropped connection cannot cut it short
    let orchestrator = state.orchestrator.clone();
    let run = tokio::spawn(async move {
        let _guard = guard;
        orchestrator.run(exchanges).await
    });

    let outcome = run
        .await
        .map_err(|e| AppError::Internal(format!("Dialogue task failed: {e}")))?
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(RunResponse {
        transcript: outcome.transcript,
        filename: outcome.filename,
    }))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
