//! Deterministic metric computation over a projected dependency graph

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use lattice_core::DependencyGraph;
use serde::Serialize;
use thiserror::Error;

use crate::algorithms::{self, NodeTable};

/// Betweenness is O(|V||E|) and dominates on large graphs; above this
/// node count it is skipped and reported as the `-1.0` sentinel.
pub const MAX_NODES_FOR_BETWEENNESS: usize = 2000;

/// Default wall-clock budget for a full metric computation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-component metric record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentMetrics {
    pub in_degree: usize,
    pub out_degree: usize,
    pub total_degree: usize,
    pub weighted_in: u64,
    pub weighted_out: u64,
    pub betweenness: f64,
    pub closeness: f64,
    pub scc_id: usize,
    pub scc_size: usize,
    pub blast_radius: usize,
    pub fan_in_ratio: f64,
    pub fan_out_ratio: f64,
    pub scc_density: f64,
    pub reachability_ratio: f64,
}

/// Run-scoped metric matrix, keyed by component id in ascending order.
pub type MetricsMatrix = BTreeMap<String, ComponentMetrics>;

#[derive(Debug, Error)]
pub enum MetricError {
    #[error(
        "metric computation exceeded {budget:?} on {nodes} nodes / {edges} edges (elapsed {elapsed:?})"
    )]
    Timeout {
        nodes: usize,
        edges: usize,
        budget: Duration,
        elapsed: Duration,
    },
}

/// Wall-clock guard checked cooperatively between phases and inside the
/// per-source traversal loops. No partial results survive an expiry.
pub(crate) struct Deadline {
    started: Instant,
    budget: Duration,
    nodes: usize,
    edges: usize,
}

impl Deadline {
    fn new(budget: Duration, nodes: usize, edges: usize) -> Self {
        Deadline {
            started: Instant::now(),
            budget,
            nodes,
            edges,
        }
    }

    pub(crate) fn check(&self) -> Result<(), MetricError> {
        let elapsed = self.started.elapsed();
        if elapsed >= self.budget {
            return Err(MetricError::Timeout {
                nodes: self.nodes,
                edges: self.edges,
                budget: self.budget,
                elapsed,
            });
        }
        Ok(())
    }
}

/// Computes the full metric matrix for one graph.
///
/// Every value is a pure function of the graph: node tables are sorted by
/// id, adjacency lists are deduplicated and sorted, and all floating-point
/// accumulation runs in that canonical order.
pub struct MetricEngine<'g> {
    graph: &'g DependencyGraph,
}

impl<'g> MetricEngine<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        MetricEngine { graph }
    }

    /// Compute all metrics under a wall-clock budget.
    pub fn calculate_all(&self, timeout: Duration) -> Result<MetricsMatrix, MetricError> {
        let deadline = Deadline::new(timeout, self.graph.node_count(), self.graph.edge_count());
        let table = NodeTable::build(self.graph);
        let n = table.len();
        let divisor = n.max(1) as f64;

        // degree metrics, straight off the typed edge set
        let mut in_degree = vec![0usize; n];
        let mut out_degree = vec![0usize; n];
        let mut weighted_in = vec![0u64; n];
        let mut weighted_out = vec![0u64; n];
        for edge in self.graph.edges() {
            let (Some(source), Some(target)) = (
                table.index_of(&edge.source_id),
                table.index_of(&edge.target_id),
            ) else {
                continue;
            };
            out_degree[source] += 1;
            in_degree[target] += 1;
            weighted_out[source] += edge.weight;
            weighted_in[target] += edge.weight;
        }
        deadline.check()?;

        let betweenness = if n <= MAX_NODES_FOR_BETWEENNESS {
            algorithms::betweenness(&table, &deadline)?
        } else {
            tracing::warn!(
                nodes = n,
                limit = MAX_NODES_FOR_BETWEENNESS,
                "graph too large for betweenness, reporting sentinel"
            );
            vec![-1.0; n]
        };

        let closeness = algorithms::closeness(&table, &deadline)?;
        let (scc_id, scc_size) = algorithms::strongly_connected(&table);
        deadline.check()?;
        let blast_radius = algorithms::blast_radius(&table, &deadline)?;

        let mut matrix = MetricsMatrix::new();
        for (i, id) in table.ids().iter().enumerate() {
            matrix.insert(
                id.clone(),
                ComponentMetrics {
                    in_degree: in_degree[i],
                    out_degree: out_degree[i],
                    total_degree: in_degree[i] + out_degree[i],
                    weighted_in: weighted_in[i],
                    weighted_out: weighted_out[i],
                    betweenness: betweenness[i],
                    closeness: closeness[i],
                    scc_id: scc_id[i],
                    scc_size: scc_size[i],
                    blast_radius: blast_radius[i],
                    fan_in_ratio: in_degree[i] as f64 / divisor,
                    fan_out_ratio: out_degree[i] as f64 / divisor,
                    scc_density: scc_size[i] as f64 / divisor,
                    reachability_ratio: blast_radius[i] as f64 / divisor,
                },
            );
        }
        Ok(matrix)
    }
}
