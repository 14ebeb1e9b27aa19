//! HTTP server for the dashboard API and metrics intake

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use log::info;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::ledger::reader::LedgerStore;
use crate::ledger::routes as dashboard;
use crate::metrics::routes as metrics;
use crate::metrics::sink::{sink_from_config, EventSink};

/// Shared state for all route handlers
#[derive(Clone)]
pub struct AppState {
    pub store: LedgerStore,
    pub config: Arc<ServerConfig>,
    pub sink: Arc<dyn EventSink>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid bind address: {0}")]
    Addr(#[from] std::net::AddrParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dashboard API server
pub struct DashboardServer {
    config: ServerConfig,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl DashboardServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            shutdown_tx: None,
        }
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Build the application router with its state.
    pub fn router(config: ServerConfig) -> Router {
        let state = AppState {
            store: LedgerStore::new(&config.data_dir),
            sink: sink_from_config(&config.metrics),
            config: Arc::new(config),
        };

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/dashboard/stats", get(dashboard::stats))
            .route("/api/dashboard/time", get(dashboard::time))
            .route("/api/dashboard/revenue", get(dashboard::revenue))
            .route("/api/dashboard/costs", get(dashboard::costs))
            .route(
                "/api/gf-track",
                post(metrics::track).options(metrics::preflight),
            )
            .layer(cors)
            .with_state(state)
    }

    /// Start serving in a background task.
    pub async fn start(&mut self) -> Result<(), ServerError> {
        let app = Self::router(self.config.clone());
        let addr: SocketAddr =
            format!("{}:{}", self.config.bind_address, self.config.port).parse()?;

        info!(
            "starting dashboard server on {} (data: {:?})",
            addr, self.config.data_dir
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    info!("dashboard server shutting down");
                })
                .await
                .ok();
        });

        Ok(())
    }

    /// Trigger graceful shutdown.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_lifecycle_flags() {
        let mut server = DashboardServer::new(ServerConfig::default());
        assert!(!server.is_running());
        server.stop();
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_start_and_stop_on_ephemeral_port() {
        // Port 0 asks the OS for a free port; bind must succeed.
        let config = ServerConfig::default().with_port(0);
        let mut server = DashboardServer::new(config);
        server.start().await.unwrap();
        assert!(server.is_running());
        server.stop();
        assert!(!server.is_running());
    }
}
