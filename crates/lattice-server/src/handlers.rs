//! REST API handlers for the analysis server

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use lattice_store::ComponentRow;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::service::{AnalysisService, RunSummary};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub project_path: String,
    #[serde(default = "default_project_name")]
    pub project_name: String,
}

fn default_project_name() -> String {
    "default_project".to_string()
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub run_id: i64,
    pub components: Vec<ComponentRow>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub timestamp: String,
}

type HandlerError = (StatusCode, String);

fn internal(message: impl Into<String>) -> HandlerError {
    (StatusCode::INTERNAL_SERVER_ERROR, message.into())
}

/// Run a full analysis of the posted source tree and return the summary.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<RunSummary>, HandlerError> {
    let store = Arc::clone(&state.store);
    let path = PathBuf::from(&request.project_path);
    let name = request.project_name.clone();

    let summary = tokio::task::spawn_blocking(move || {
        let mut store = store.blocking_lock();
        let project_id = store.get_or_create_project(&name)?;
        AnalysisService::new(&mut *store)
            .run_analysis(project_id, &path)
            .map_err(anyhow::Error::from)
    })
    .await
    .map_err(|err| internal(format!("analysis task failed: {err}")))?
    .map_err(|err| internal(err.to_string()))?;

    Ok(Json(summary))
}

/// Metric rows for one run, ordered by component name.
pub async fn metrics(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<i64>,
) -> Result<Json<MetricsResponse>, HandlerError> {
    let store = state.store.lock().await;
    let components = store
        .metrics_for_run(run_id)
        .map_err(|err| internal(err.to_string()))?;
    Ok(Json(MetricsResponse { run_id, components }))
}

/// Health check with a database connectivity probe.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, HandlerError> {
    let store = state.store.lock().await;
    match store.ping() {
        Ok(()) => Ok(Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: "connected".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })),
        Err(err) => {
            tracing::error!(error = %err, "database probe failed during health check");
            Err(internal("database connection failed"))
        }
    }
}
