//! Lattice core — dependency graph model, projection, and canonical JSON

pub mod graph;
pub mod model;
pub mod projection;
pub mod serialize;


pub use graph::DependencyGraph;
pub use model::{Edge, EdgeType, Node, NodeType};
pub use projection::{STRUCTURAL_EDGE_TYPES, project, structural_projection};
pub use serialize::to_canonical_json;
