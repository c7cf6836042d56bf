//! HTTP transport for the ranking service
//!
//! Routes are thin wrappers over [`RankingService`](crate::service::RankingService)
//! operations. Everything is served from a single axum router which also
//! carries the health and Prometheus endpoints.

pub mod admin;
pub mod error;
pub mod extract;
pub mod handlers;

pub use admin::{AdminCapability, ADMIN_TOKEN_HEADER};
pub use error::ApiError;
pub use extract::{ApiJson, ApiPath, ApiQuery};

use crate::service::AppState;
use anyhow::{Context, Result};
use axum::routing::{delete, get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Build the router with every route bound to the shared state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/match", get(handlers::match_handler))
        .route("/vote", post(handlers::vote_handler))
        .route("/tie", post(handlers::tie_handler))
        .route("/skip", post(handlers::skip_handler))
        .route("/see", get(handlers::leaderboard_handler))
        .route("/history", get(handlers::history_handler))
        .route("/add", post(handlers::add_handler))
        .route("/movies/{id}", delete(handlers::delete_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}

/// HTTP server with broadcast-driven graceful shutdown
pub struct HttpServer {
    addr: String,
    state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
}

impl HttpServer {
    pub fn new(state: Arc<AppState>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            addr: state.config().http_addr(),
            state,
            shutdown_tx,
        }
    }

    /// Serve until a shutdown signal arrives
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .with_context(|| format!("Invalid HTTP address: {}", self.addr))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        info!("HTTP server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("HTTP server shutdown signal received");
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping HTTP server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to HTTP server: {}", e);
        }
    }
}
