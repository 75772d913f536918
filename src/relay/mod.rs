//! The relay HTTP service.
//!
//! One pass-through endpoint: `POST /api/chat` forwards a single message to
//! the provider and returns its full reply as JSON. Requests are handled
//! independently; there is no queueing, no retry, and no concurrency limit
//! beyond the runtime's. A `GET /health` heartbeat and a CORS layer round
//! out the surface.

pub mod error;
pub mod provider;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::api::{ChatReply, ChatRequest};
use crate::core::config::Config;
use crate::relay::error::RelayError;
use crate::relay::provider::{GeminiProvider, Provider};

/// State shared across all handlers.
pub struct RelayState {
    pub provider: Arc<dyn Provider>,
}

/// Assemble the application router.
pub fn build(state: Arc<RelayState>, allowed_origins: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// Run the relay until SIGINT or SIGTERM.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let api_key = config
        .gemini_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY is not set"))?;
    let provider: Arc<dyn Provider> = Arc::new(GeminiProvider::new(api_key, config.model.clone()));
    let state = Arc::new(RelayState { provider });

    let app = build(state, config.cors_allowed_origins.as_deref());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, model = %config.model, "relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("relay stopped");
    Ok(())
}

/// Relay one chat message (`POST /api/chat`).
///
/// `history` is accepted for wire compatibility but the provider call is
/// stateless; only the trimmed message is forwarded.
async fn chat(
    State(state): State<Arc<RelayState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, RelayError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(RelayError::InvalidRequest);
    }

    debug!(
        prompt_len = message.len(),
        history_len = request.history.len(),
        provider = state.provider.name(),
        "chat relay request"
    );

    let reply = state.provider.generate(message).await?;
    info!(output_len = reply.len(), "chat relay done");

    Ok(Json(ChatReply { reply, image: None }))
}

/// Heartbeat endpoint for monitoring.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = allowed_origins
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        // Wildcard, matching the development posture of the original stack.
        CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(Any)
            .allow_methods(Any)
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_headers(Any)
            .allow_methods(Any)
    }
}

/// Resolves when SIGINT (Ctrl-C) or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received; starting graceful shutdown");
}

// ── Tests ────────────────────────────────────────────────────────────────────
