//! Dialogue Chamber - two models in conversation
//!
//! Serves a single page and a `/run` endpoint that drives a turn-based
//! dialogue between two configured models, writing each run to a transcript
//! file.

mod api;
mod config;
mod dialogue;
mod llm;
mod prompts;

use api::{create_router, AppState};
use config::AppConfig;
use dialogue::DialogueOrchestrator;
use llm::ModelGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real environment variables still apply
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dialogue_chamber=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Failed to load .env"),
    }

    // Configuration
    let config = AppConfig::from_env()?;

    let gateway = ModelGateway::new(&config.llm, config.system_prompt.clone(), config.max_tokens);
    if gateway.available_providers().is_empty() {
        tracing::warn!("No LLM API keys configured. Set ANTHROPIC_API_KEY, OPENAI_API_KEY or LLM_GATEWAY.");
    }
    config.validate(&gateway)?;

    tracing::info!(
        providers = ?gateway.available_providers(),
        model_1 = %config.dialogue.model_1,
        model_2 = %config.dialogue.model_2,
        transcript_dir = %config.dialogue.transcript_dir.display(),
        turn_delay_ms = %config.dialogue.turn_delay.as_millis(),
        history_window = ?config.dialogue.history_window,
        "Model gateway initialized"
    );

    // Cancelled on shutdown so an in-flight run stops at its next pause
    let shutdown = CancellationToken::new();
    let orchestrator = DialogueOrchestrator::new(Arc::new(gateway), config.dialogue.clone())
        .with_cancellation(shutdown.child_token());

    let state = AppState::new(orchestrator);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Dialogue Chamber listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown requested");
    shutdown.cancel();
}
