// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use batsignal_agent::{Capabilities, ChatPipeline};
use batsignal_core::BatsignalError;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;

/// Data behind `/health`.
#[derive(Debug, Clone)]
pub struct HealthState {
    pub start_time: Instant,
    pub agent_name: String,
    pub capabilities: Capabilities,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<ChatPipeline>,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `[gateway]` from batsignal-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `voice.html`, `text.html`, and the `/static` assets.
    pub static_dir: PathBuf,
}

/// All routes with CORS and request tracing applied.
pub fn build_router(state: GatewayState, static_dir: PathBuf) -> Router {
    let voice = ServeFile::new(static_dir.join("voice.html"));
    let text = ServeFile::new(static_dir.join("text.html"));

    let api = Router::new()
        .route("/chat", post(handlers::post_chat))
        .route("/view_logs", get(handlers::get_view_logs))
        .route("/health", get(handlers::get_health))
        .with_state(state);

    Router::new()
        .merge(api)
        .route_service("/", voice.clone())
        .route_service("/voice", voice)
        .route_service("/text", text)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Binds `host:port` and serves until `shutdown` resolves.
pub async fn start_server<F>(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: F,
) -> Result<(), BatsignalError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state, config.static_dir.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| BatsignalError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    info!("gateway listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| BatsignalError::Internal(format!("gateway server error: {e}")))?;

    info!("gateway stopped");
    Ok(())
}
