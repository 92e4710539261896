//! Graph store wrapping petgraph::StableDiGraph with id-keyed lookup

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};

use crate::model::{Edge, EdgeType, Node, NodeType};

/// The dependency graph — a typed directed multigraph over components.
///
/// Nodes are keyed by fully-qualified id; edges are keyed by
/// `(source, target, edge type)` so parallel edges of different types
/// coexist while duplicates of the same type accumulate weight.
pub struct DependencyGraph {
    inner: StableDiGraph<Node, Edge>,
    ids: HashMap<String, NodeIndex>,
    edge_keys: HashMap<(NodeIndex, NodeIndex, EdgeType), EdgeIndex>,
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph {
            inner: StableDiGraph::new(),
            ids: HashMap::new(),
            edge_keys: HashMap::new(),
        }
    }

    /// Insert a node. A second insert with an id already present is a no-op.
    /// Returns whether the node was actually added.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.ids.contains_key(&node.id) {
            return false;
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.ids.insert(id, idx);
        true
    }

    /// Insert an edge, enforcing the store invariants:
    /// self-loops are rejected, edges with a missing endpoint are dropped,
    /// and a duplicate `(source, target, type)` accumulates onto the
    /// existing edge's weight instead of creating a new record.
    /// Returns whether the edge was accepted (merging counts as accepted).
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if edge.source_id == edge.target_id {
            tracing::debug!(id = %edge.source_id, "rejected self-loop edge");
            return false;
        }
        let (Some(&source), Some(&target)) =
            (self.ids.get(&edge.source_id), self.ids.get(&edge.target_id))
        else {
            tracing::debug!(
                source = %edge.source_id,
                target = %edge.target_id,
                "dropped edge with missing endpoint"
            );
            return false;
        };
        let key = (source, target, edge.edge_type);
        if let Some(&existing) = self.edge_keys.get(&key) {
            if let Some(record) = self.inner.edge_weight_mut(existing) {
                record.weight += edge.weight;
            }
            return true;
        }
        let idx = self.inner.add_edge(source, target, edge);
        self.edge_keys.insert(key, idx);
        true
    }

    /// Look up a node by its fully-qualified id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.ids.get(id).and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Look up a specific typed edge between two components.
    pub fn edge(&self, source_id: &str, target_id: &str, edge_type: EdgeType) -> Option<&Edge> {
        let (&source, &target) = (self.ids.get(source_id)?, self.ids.get(target_id)?);
        self.edge_keys
            .get(&(source, target, edge_type))
            .and_then(|&idx| self.inner.edge_weight(idx))
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Number of nodes declared as classes (interfaces and traits excluded).
    pub fn class_count(&self) -> usize {
        self.nodes()
            .filter(|n| n.node_type == NodeType::Class)
            .count()
    }

    /// Iterate over all nodes in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// All nodes sorted by id ascending.
    pub fn sorted_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// All edges sorted by `(source, target, type)` ascending.
    pub fn sorted_edges(&self) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.edges().collect();
        edges.sort_by(|a, b| {
            (a.source_id.as_str(), a.target_id.as_str(), a.edge_type.as_str()).cmp(&(
                b.source_id.as_str(),
                b.target_id.as_str(),
                b.edge_type.as_str(),
            ))
        });
        edges
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
