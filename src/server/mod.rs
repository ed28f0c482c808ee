//! HTTP server for the classification service.
//!
//! This module provides:
//! - The axum router and request handlers
//! - Error mapping from pipeline errors onto HTTP responses
//! - Server startup with graceful shutdown

pub mod routes;

pub use routes::{AppState, create_router};

use crate::core::ProbabilityModel;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;

/// HTTP server error types.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind the listen socket.
    #[error("failed to bind to {address}: {source}")]
    Bind {
        /// Address that failed to bind.
        address: String,
        /// Source error.
        source: std::io::Error,
    },

    /// Server runtime error.
    #[error("server error: {0}")]
    Server(String),
}

/// HTTP server wrapping the router and its lifecycle.
pub struct HttpServer {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl HttpServer {
    /// Creates a server bound to the given address once started.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Starts serving requests until shutdown is signalled.
    pub async fn start<M>(&self, state: AppState<M>) -> Result<(), ServerError>
    where
        M: ProbabilityModel + Send + Sync + 'static,
    {
        let router = create_router(state).layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| ServerError::Bind {
                address: self.addr.to_string(),
                source: e,
            })?;

        tracing::info!("inference server listening on {}", self.addr);

        let shutdown = self.shutdown.clone();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.notified().await;
            })
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }

    /// Signals the server to shut down gracefully.
    pub fn shutdown(&self) {
        tracing::info!("shutting down inference server");
        self.shutdown.notify_one();
    }
}
