//! Local HTTP surface: the embedded UI and three JSON endpoints.
//!
//! Every endpoint is reachable both at `/<name>` and `/api/git/<name>`.

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::git::GitRepository;
use crate::llm::LlmRouter;

/// Read-only state shared by every request.
pub struct AppState {
    pub git: GitRepository,
    pub drafter: LlmRouter,
}

impl AppState {
    pub fn new(git: GitRepository, drafter: LlmRouter) -> Self {
        Self { git, drafter }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            GitRepository::from_config(&config.git),
            LlmRouter::from_settings(&config.providers),
        )
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/status", post(handlers::status))
        .route("/api/git/status", post(handlers::status))
        .route("/generate-commit", post(handlers::generate_commit))
        .route("/api/git/generate-commit", post(handlers::generate_commit))
        .route("/commit", post(handlers::commit))
        .route("/api/git/commit", post(handlers::commit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{addr}");
    }
    if state.drafter.providers().is_empty() {
        info!("No LLM provider configured; drafting will report setup guidance");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
}
