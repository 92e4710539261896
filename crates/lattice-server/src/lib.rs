//! HTTP surface and run orchestration

pub mod handlers;
pub mod router;
pub mod service;

use std::sync::Arc;

use lattice_store::Store;
use tokio::sync::Mutex;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Shared state behind every handler.
///
/// The store is behind an async mutex; analysis runs hold it for their
/// whole duration, which also serializes runs (one at a time per server).
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

pub struct LatticeServer {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl LatticeServer {
    pub fn new(store: Store, config: ServerConfig) -> Self {
        LatticeServer {
            state: Arc::new(AppState::new(store)),
            config,
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(addr = %addr, "analysis API listening");
        let router = router::create_router(self.state);
        axum::serve(listener, router).await?;
        Ok(())
    }
}
