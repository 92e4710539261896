//! Canonical JSON serialization of the dependency graph
//!
//! The output is a node-link document with both arrays totally ordered,
//! so byte-identical input trees always serialize to byte-identical JSON.

use serde::Serialize;

use crate::graph::DependencyGraph;

#[derive(Serialize)]
struct NodeRecord<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    node_type: &'static str,
    file_path: &'a str,
    methods: &'a [String],
}

#[derive(Serialize)]
struct LinkRecord<'a> {
    source: &'a str,
    target: &'a str,
    #[serde(rename = "type")]
    edge_type: &'static str,
    weight: u64,
}

#[derive(Serialize)]
struct GraphDocument<'a> {
    nodes: Vec<NodeRecord<'a>>,
    links: Vec<LinkRecord<'a>>,
}

/// Serialize the graph as canonical JSON: nodes sorted by id, links sorted
/// by `(source, target, type)`, 2-space indentation, stable key order.
pub fn to_canonical_json(graph: &DependencyGraph) -> serde_json::Result<String> {
    let nodes = graph
        .sorted_nodes()
        .into_iter()
        .map(|n| NodeRecord {
            id: &n.id,
            name: &n.name,
            node_type: n.node_type.as_str(),
            file_path: &n.file_path,
            methods: &n.methods,
        })
        .collect();
    let links = graph
        .sorted_edges()
        .into_iter()
        .map(|e| LinkRecord {
            source: &e.source_id,
            target: &e.target_id,
            edge_type: e.edge_type.as_str(),
            weight: e.weight,
        })
        .collect();
    serde_json::to_string_pretty(&GraphDocument { nodes, links })
}
