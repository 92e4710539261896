//! Graph algorithms over a sorted, index-based node table
//!
//! Every traversal runs on the same substrate: node ids sorted ascending,
//! successor lists deduplicated and sorted by target index. That fixes
//! the iteration order of every loop, which in turn fixes the summation
//! order of every floating-point accumulation.

use std::collections::{HashMap, VecDeque};

use lattice_core::DependencyGraph;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::engine::{Deadline, MetricError};

/// Sorted id table with deduplicated adjacency.
///
/// Parallel typed edges between the same pair collapse to a single arc
/// here; shortest-path structure is about reachability, not edge
/// multiplicity. Degree metrics are computed off the raw edge set instead.
pub(crate) struct NodeTable {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    succ: Vec<Vec<usize>>,
}

impl NodeTable {
    pub(crate) fn build(graph: &DependencyGraph) -> Self {
        let ids: Vec<String> = graph
            .sorted_nodes()
            .into_iter()
            .map(|n| n.id.clone())
            .collect();
        let index: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let mut succ = vec![Vec::new(); ids.len()];
        for edge in graph.edges() {
            let (Some(&source), Some(&target)) =
                (index.get(&edge.source_id), index.get(&edge.target_id))
            else {
                continue;
            };
            succ[source].push(target);
        }
        for list in &mut succ {
            list.sort_unstable();
            list.dedup();
        }
        NodeTable { ids, index, succ }
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn ids(&self) -> &[String] {
        &self.ids
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }
}

fn bfs_distances(succ: &[Vec<usize>], start: usize) -> Vec<i64> {
    let mut dist = vec![-1i64; succ.len()];
    dist[start] = 0;
    let mut queue = VecDeque::new();
    queue.push_back(start);
    while let Some(v) = queue.pop_front() {
        for &w in &succ[v] {
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
        }
    }
    dist
}

/// Brandes' betweenness centrality, directed and unweighted, normalized
/// by `(n-1)(n-2)` so computed values land in `[0, 1]`.
pub(crate) fn betweenness(table: &NodeTable, deadline: &Deadline) -> Result<Vec<f64>, MetricError> {
    let n = table.len();
    let mut centrality = vec![0.0f64; n];
    if n < 3 {
        return Ok(centrality);
    }

    for s in 0..n {
        deadline.check()?;

        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0f64; n];
        sigma[s] = 1.0;
        let mut dist = vec![-1i64; n];
        dist[s] = 0;
        let mut queue = VecDeque::new();
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &table.succ[v] {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                centrality[w] += delta[w];
            }
        }
    }

    let scale = 1.0 / (((n - 1) * (n - 2)) as f64);
    for value in &mut centrality {
        *value *= scale;
    }
    Ok(centrality)
}

/// Closeness over outgoing reachability with reachable-fraction scaling:
/// `(r / d) * (r / (n - 1))` for `r` reachable nodes at total distance
/// `d`, self excluded. Isolated nodes and single-node graphs score zero.
pub(crate) fn closeness(table: &NodeTable, deadline: &Deadline) -> Result<Vec<f64>, MetricError> {
    let n = table.len();
    let mut result = vec![0.0f64; n];
    for s in 0..n {
        deadline.check()?;
        let dist = bfs_distances(&table.succ, s);
        let mut reachable = 0u64;
        let mut total = 0u64;
        for (v, &d) in dist.iter().enumerate() {
            if v != s && d > 0 {
                reachable += 1;
                total += d as u64;
            }
        }
        if total > 0 && n > 1 {
            let r = reachable as f64;
            result[s] = (r / total as f64) * (r / (n - 1) as f64);
        }
    }
    Ok(result)
}

/// Strongly-connected components via Tarjan, with component ids assigned
/// by ascending minimum member id so numbering is reproducible.
/// Returns `(scc_id, scc_size)` per node.
pub(crate) fn strongly_connected(table: &NodeTable) -> (Vec<usize>, Vec<usize>) {
    let n = table.len();
    let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(n, 0);
    for _ in 0..n {
        graph.add_node(());
    }
    for (v, successors) in table.succ.iter().enumerate() {
        for &w in successors {
            graph.add_edge(NodeIndex::new(v), NodeIndex::new(w), ());
        }
    }

    let mut components: Vec<Vec<usize>> = tarjan_scc(&graph)
        .into_iter()
        .map(|component| component.into_iter().map(|idx| idx.index()).collect())
        .collect();
    for component in &mut components {
        component.sort_unstable();
    }
    // ids are sorted, so the minimum index is the minimum id
    components.sort_by_key(|component| component[0]);

    let mut scc_id = vec![0usize; n];
    let mut scc_size = vec![0usize; n];
    for (id, component) in components.iter().enumerate() {
        for &v in component {
            scc_id[v] = id;
            scc_size[v] = component.len();
        }
    }
    (scc_id, scc_size)
}

/// Directed reachability count per node, excluding the node itself.
pub(crate) fn blast_radius(
    table: &NodeTable,
    deadline: &Deadline,
) -> Result<Vec<usize>, MetricError> {
    let n = table.len();
    let mut result = vec![0usize; n];
    for s in 0..n {
        deadline.check()?;
        let dist = bfs_distances(&table.succ, s);
        result[s] = dist
            .iter()
            .enumerate()
            .filter(|&(v, &d)| v != s && d > 0)
            .count();
    }
    Ok(result)
}
