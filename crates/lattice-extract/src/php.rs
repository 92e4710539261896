//! Pattern-based extraction of PHP structural declarations and references
//!
//! This is deliberately not a parser. The patterns recognize namespace,
//! class/interface/trait declarations with their inheritance clauses, and
//! lexical reference sites (`new Target(`, `Target::method(`). Reference
//! sites and `use` lines attach to the most recently declared class in
//! the file; files declaring no class emit no reference edges.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use lattice_core::{Edge, EdgeType, Node, NodeType};
use regex::Regex;

use crate::resolver::qualify;

static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*namespace\s+([\w\\]+)\s*;").unwrap());
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bclass\s+([A-Za-z0-9_]+)(?:\s+extends\s+([A-Za-z0-9_\\]+))?(?:\s+implements\s+([\w,\s\\]+?))?\s*\{",
    )
    .unwrap()
});
static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\binterface\s+([A-Za-z0-9_]+)").unwrap());
static TRAIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btrait\s+([A-Za-z0-9_]+)").unwrap());
static USE_TRAIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*use\s+([\w,\s\\]+?);").unwrap());
static METHOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunction\s+([A-Za-z0-9_]+)").unwrap());
static INSTANTIATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnew\s+([\w\\]+)\s*\(").unwrap());
static STATIC_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([\w\\]+)::\w+\s*\(").unwrap());
static LIST_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s,]+").unwrap());

/// Nodes and edges extracted from a single file.
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Extracts typed nodes and edges from PHP sources under an analysis root.
pub struct PhpExtractor {
    root: PathBuf,
}

impl PhpExtractor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PhpExtractor { root: root.into() }
    }

    /// Extract one file. Read failures are logged and yield an empty
    /// result so a single bad file never aborts a sweep.
    pub fn extract_file(&self, path: &Path) -> ExtractionResult {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "skipping unreadable file");
                return ExtractionResult::default();
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        self.extract_source(path, &content)
    }

    /// Pattern-level extraction over already-decoded source text.
    pub fn extract_source(&self, path: &Path, content: &str) -> ExtractionResult {
        let namespace = NAMESPACE_RE
            .captures(content)
            .map(|caps| caps[1].to_string());
        let file_path = path.to_string_lossy().into_owned();
        let fq = |raw: &str| qualify(raw, namespace.as_deref(), path, &self.root);

        let methods: Vec<String> = METHOD_RE
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .collect();

        let mut result = ExtractionResult::default();

        for caps in CLASS_RE.captures_iter(content) {
            let class_name = caps[1].to_string();
            let class_id = fq(&class_name);

            if let Some(parent) = caps.get(2) {
                let target = fq(parent.as_str());
                if target != class_id {
                    result.edges.push(Edge::new(class_id.as_str(), target, EdgeType::Inherits));
                }
            }
            if let Some(interfaces) = caps.get(3) {
                for interface in LIST_SPLIT_RE.split(interfaces.as_str().trim()) {
                    if interface.is_empty() {
                        continue;
                    }
                    let target = fq(interface);
                    if target != class_id {
                        result
                            .edges
                            .push(Edge::new(class_id.as_str(), target, EdgeType::Implements));
                    }
                }
            }

            result.nodes.push(Node {
                id: class_id,
                name: class_name,
                namespace: namespace.clone(),
                node_type: NodeType::Class,
                file_path: file_path.clone(),
                methods: methods.clone(),
            });
        }

        for caps in INTERFACE_RE.captures_iter(content) {
            let name = caps[1].to_string();
            result.nodes.push(Node {
                id: fq(&name),
                name,
                namespace: namespace.clone(),
                node_type: NodeType::Interface,
                file_path: file_path.clone(),
                methods: methods.clone(),
            });
        }

        for caps in TRAIT_RE.captures_iter(content) {
            let name = caps[1].to_string();
            result.nodes.push(Node {
                id: fq(&name),
                name,
                namespace: namespace.clone(),
                node_type: NodeType::Trait,
                file_path: file_path.clone(),
                methods: methods.clone(),
            });
        }

        // Reference sites attach to the most recently declared class in
        // this file. Edges pointing back at the enclosing class itself are
        // dropped at emission.
        let enclosing = result
            .nodes
            .iter()
            .rev()
            .find(|n| n.node_type == NodeType::Class)
            .map(|n| n.id.clone());
        if let Some(enclosing) = enclosing {
            for caps in INSTANTIATE_RE.captures_iter(content) {
                let target = fq(&caps[1]);
                if target != enclosing {
                    result
                        .edges
                        .push(Edge::new(enclosing.as_str(), target, EdgeType::Instantiation));
                }
            }
            for caps in STATIC_CALL_RE.captures_iter(content) {
                let target = fq(&caps[1]);
                if target != enclosing {
                    result
                        .edges
                        .push(Edge::new(enclosing.as_str(), target, EdgeType::MethodCall));
                }
            }
            for caps in USE_TRAIT_RE.captures_iter(content) {
                for name in LIST_SPLIT_RE.split(caps[1].trim()) {
                    if name.is_empty() {
                        continue;
                    }
                    let target = fq(name);
                    if target != enclosing {
                        result
                            .edges
                            .push(Edge::new(enclosing.as_str(), target, EdgeType::UsesTrait));
                    }
                }
            }
        }

        result
    }
}
