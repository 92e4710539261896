//! Run orchestration: scan → extract → assemble → project → measure → persist

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use lattice_core::{DependencyGraph, structural_projection, to_canonical_json};
use lattice_extract::{PhpExtractor, scan};
use lattice_metrics::{DEFAULT_TIMEOUT, MetricEngine, MetricError};
use lattice_store::{RunRepository, StoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Metrics(#[from] MetricError),
    #[error("graph serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Summary handed back to callers after a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: i64,
    pub files: u64,
    pub classes: u64,
    pub edges: u64,
}

/// Sequences one analysis run against a persistence collaborator.
///
/// A run is atomic from the caller's perspective: on any error the run
/// row is marked failed with the message preserved and the error is
/// re-raised. The service itself never retries.
pub struct AnalysisService<'a, R: RunRepository> {
    repo: &'a mut R,
    metric_timeout: Duration,
}

impl<'a, R: RunRepository> AnalysisService<'a, R> {
    pub fn new(repo: &'a mut R) -> Self {
        AnalysisService {
            repo,
            metric_timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_metric_timeout(mut self, timeout: Duration) -> Self {
        self.metric_timeout = timeout;
        self
    }

    pub fn run_analysis(
        &mut self,
        project_id: i64,
        project_path: &Path,
    ) -> Result<RunSummary, AnalysisError> {
        let run_id = self.repo.create_run(project_id)?;
        match self.execute(run_id, project_path) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                tracing::error!(run_id, error = %err, "analysis run failed");
                if let Err(mark_err) = self.repo.mark_failed(run_id, &err.to_string()) {
                    tracing::error!(run_id, error = %mark_err, "could not record run failure");
                }
                Err(err)
            }
        }
    }

    fn execute(&mut self, run_id: i64, project_path: &Path) -> Result<RunSummary, AnalysisError> {
        let files = scan(project_path, None);
        tracing::info!(run_id, files = files.len(), root = %project_path.display(), "scanned source tree");

        let extractor = PhpExtractor::new(project_path);
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for file in &files {
            let result = extractor.extract_file(file);
            nodes.extend(result.nodes);
            edges.extend(result.edges);
        }

        let mut graph = DependencyGraph::new();
        for node in nodes {
            graph.add_node(node);
        }
        for edge in edges {
            graph.add_edge(edge);
        }

        let total_files = files.len() as u64;
        let total_classes = graph.class_count() as u64;
        let total_edges = graph.edge_count() as u64;

        let projected = structural_projection(&graph);
        let matrix = MetricEngine::new(&projected).calculate_all(self.metric_timeout)?;

        let node_types: BTreeMap<String, String> = graph
            .nodes()
            .map(|n| (n.id.clone(), n.node_type.as_str().to_string()))
            .collect();
        self.repo.save_component_metrics(run_id, &matrix, &node_types)?;

        let json = to_canonical_json(&graph)?;
        self.repo.save_graph_json(run_id, json.as_bytes())?;

        self.repo
            .update_totals(run_id, total_files, total_classes, total_edges)?;
        self.repo.mark_completed(run_id)?;

        tracing::info!(
            run_id,
            classes = total_classes,
            edges = total_edges,
            "analysis run completed"
        );
        Ok(RunSummary {
            run_id,
            files: total_files,
            classes: total_classes,
            edges: total_edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    use lattice_store::Store;
    use tempfile::TempDir;

    fn write_fixture(root: &Path) {
        fs::write(
            root.join("Repository.php"),
            "<?php\nnamespace App;\n\nclass Repository {\n    public function find() {}\n}\n",
        )
        .unwrap();
        fs::write(
            root.join("Service.php"),
            "<?php\nnamespace App;\n\nclass Service extends Repository {\n    public function handle() {\n        $r = new Repository();\n        Repository::find();\n    }\n}\n",
        )
        .unwrap();
    }

    #[test]
    fn run_analysis_persists_summary_and_metrics() {
        let project = TempDir::new().unwrap();
        write_fixture(project.path());
        let data = TempDir::new().unwrap();
        let mut store = Store::open_in_memory(data.path()).unwrap();
        let project_id = store.get_or_create_project("fixture").unwrap();

        let summary = AnalysisService::new(&mut store)
            .run_analysis(project_id, project.path())
            .unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(summary.classes, 2);
        // inherits + instantiation + method_call, all Service -> Repository
        assert_eq!(summary.edges, 3);

        let (status, _) = store.run_status(summary.run_id).unwrap();
        assert_eq!(status, "completed");

        let rows = store.metrics_for_run(summary.run_id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "App\\Repository");
        assert_eq!(rows[0].in_degree, 3);
        assert_eq!(rows[1].name, "App\\Service");
        assert_eq!(rows[1].out_degree, 3);

        let artifact = data.path().join(format!("graph_{}.json", summary.run_id));
        assert!(artifact.exists());
    }

    #[test]
    fn failed_run_is_marked_with_message() {
        let project = TempDir::new().unwrap();
        write_fixture(project.path());
        let data = TempDir::new().unwrap();
        let mut store = Store::open_in_memory(data.path()).unwrap();
        let project_id = store.get_or_create_project("fixture").unwrap();

        let err = AnalysisService::new(&mut store)
            .with_metric_timeout(Duration::ZERO)
            .run_analysis(project_id, project.path())
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Metrics(MetricError::Timeout { .. })
        ));

        // the only run recorded in this fresh store
        let (status, error) = store.run_status(1).unwrap();
        assert_eq!(status, "failed");
        assert!(error.unwrap().contains("exceeded"));
    }
}
