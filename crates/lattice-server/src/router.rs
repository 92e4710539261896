//! Axum router setup for the analysis server

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState,
    handlers::{analyze, health, metrics},
};

/// Create the axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/metrics/:run_id", get(metrics))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_store::Store;
    use tempfile::TempDir;

    #[test]
    fn router_builds_with_store_state() {
        let data = TempDir::new().unwrap();
        let store = Store::open_in_memory(data.path()).unwrap();
        let state = Arc::new(AppState::new(store));
        let _router = create_router(state);
    }
}
