//! Typed subgraph projection

use crate::graph::DependencyGraph;
use crate::model::{EdgeType, NodeType};

/// Edge types that carry architectural meaning for centrality.
///
/// Trait usage, generic dependencies, and unknown edges are bookkeeping
/// and would distort the centrality of otherwise peripheral components.
pub const STRUCTURAL_EDGE_TYPES: [EdgeType; 4] = [
    EdgeType::MethodCall,
    EdgeType::Instantiation,
    EdgeType::Inherits,
    EdgeType::Implements,
];

/// Return a standalone subgraph filtered by node type and/or edge type.
///
/// Nodes are filtered first; the result is the vertex-induced subgraph
/// over the kept nodes, with edges further restricted to `edge_types`
/// when provided. The returned graph shares nothing with its parent, so
/// downstream mutation cannot corrupt the original.
pub fn project(
    graph: &DependencyGraph,
    node_types: Option<&[NodeType]>,
    edge_types: Option<&[EdgeType]>,
) -> DependencyGraph {
    let mut sub = DependencyGraph::new();
    for node in graph.sorted_nodes() {
        if node_types.is_none_or(|kept| kept.contains(&node.node_type)) {
            sub.add_node(node.clone());
        }
    }
    // add_edge drops anything touching a filtered-out endpoint
    for edge in graph.sorted_edges() {
        if edge_types.is_none_or(|kept| kept.contains(&edge.edge_type)) {
            sub.add_edge(edge.clone());
        }
    }
    sub
}

/// The default projection used by the analysis pipeline: every node type,
/// structural edges only.
pub fn structural_projection(graph: &DependencyGraph) -> DependencyGraph {
    project(graph, None, Some(&STRUCTURAL_EDGE_TYPES))
}
