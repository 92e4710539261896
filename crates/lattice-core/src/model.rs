//! Core data structures for the dependency graph

use serde::{Deserialize, Serialize};

/// Discriminates what kind of declared component a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Class,
    Interface,
    Trait,
    Method,
    Unknown,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Class => "class",
            NodeType::Interface => "interface",
            NodeType::Trait => "trait",
            NodeType::Method => "method",
            NodeType::Unknown => "unknown",
        }
    }
}

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    MethodCall,
    Instantiation,
    Inherits,
    Implements,
    UsesTrait,
    DependsOn,
    Unknown,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::MethodCall => "method_call",
            EdgeType::Instantiation => "instantiation",
            EdgeType::Inherits => "inherits",
            EdgeType::Implements => "implements",
            EdgeType::UsesTrait => "uses_trait",
            EdgeType::DependsOn => "depends_on",
            EdgeType::Unknown => "unknown",
        }
    }
}

/// A declared component, keyed by its fully-qualified id.
///
/// `methods` lists every method name declared in the same source file as
/// this node. It is advisory metadata and plays no role in graph topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub namespace: Option<String>,
    pub node_type: NodeType,
    pub file_path: String,
    pub methods: Vec<String>,
}

/// A directed, typed edge with an accumulated positive weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub edge_type: EdgeType,
    pub weight: u64,
}

impl Edge {
    /// New edge carrying the default unit weight.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        edge_type: EdgeType,
    ) -> Self {
        Edge {
            source_id: source_id.into(),
            target_id: target_id.into(),
            edge_type,
            weight: 1,
        }
    }
}
