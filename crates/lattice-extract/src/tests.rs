//! Unit tests for the scanner, resolver, and PHP extractor

use std::fs;
use std::path::Path;

use lattice_core::{EdgeType, NodeType};
use tempfile::TempDir;

use crate::php::PhpExtractor;
use crate::resolver::qualify;
use crate::scanner::scan;

// ── Resolver ────────────────────────────────────────────────────────────

#[test]
fn qualified_names_pass_through() {
    let id = qualify(
        "App\\Models\\User",
        Some("Other"),
        Path::new("src/a.php"),
        Path::new("."),
    );
    assert_eq!(id, "App\\Models\\User");
}

#[test]
fn declared_namespace_wins() {
    let id = qualify(
        "User",
        Some("App\\Core"),
        Path::new("src/User.php"),
        Path::new("."),
    );
    assert_eq!(id, "App\\Core\\User");
}

#[test]
fn directory_fallback_prefixes_relative_path() {
    let id = qualify(
        "User",
        None,
        Path::new("/project/src/Models/User.php"),
        Path::new("/project"),
    );
    assert_eq!(id, "src\\Models\\User");
}

#[test]
fn root_level_file_keeps_bare_name() {
    let id = qualify(
        "User",
        None,
        Path::new("/project/User.php"),
        Path::new("/project"),
    );
    assert_eq!(id, "User");
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    let id = qualify(" User ", Some("App"), Path::new("a.php"), Path::new("."));
    assert_eq!(id, "App\\User");
}

// ── Scanner ─────────────────────────────────────────────────────────────

#[test]
fn scan_is_sorted_and_filters_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.php"), "").unwrap();
    fs::write(dir.path().join("a.php"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.php"), "").unwrap();

    let files = scan(dir.path(), None);
    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(dir.path())
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, vec!["a.php", "b.php", "sub/c.php"]);
}

#[test]
fn scan_includes_hidden_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".hidden.php"), "").unwrap();
    let files = scan(dir.path(), None);
    assert_eq!(files.len(), 1);
}

#[test]
fn scan_honors_max_files_cap() {
    let dir = TempDir::new().unwrap();
    for name in ["a.php", "b.php", "c.php"] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    assert_eq!(scan(dir.path(), Some(2)).len(), 2);
    assert_eq!(scan(dir.path(), None).len(), 3);
}

#[test]
fn scan_is_deterministic_across_invocations() {
    let dir = TempDir::new().unwrap();
    for name in ["z.php", "m.php", "a.php"] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    assert_eq!(scan(dir.path(), None), scan(dir.path(), None));
}

// ── Extractor ───────────────────────────────────────────────────────────

fn extract(content: &str) -> crate::ExtractionResult {
    PhpExtractor::new(".").extract_source(Path::new("src/File.php"), content)
}

#[test]
fn class_declaration_with_inheritance_clauses() {
    let result = extract(
        r"<?php
namespace App;

class Controller extends BaseController implements Handler, Loggable {
    public function index() {}
}
",
    );
    assert_eq!(result.nodes.len(), 1);
    let node = &result.nodes[0];
    assert_eq!(node.id, "App\\Controller");
    assert_eq!(node.name, "Controller");
    assert_eq!(node.namespace.as_deref(), Some("App"));
    assert_eq!(node.node_type, NodeType::Class);
    assert_eq!(node.methods, vec!["index"]);

    let targets: Vec<(&str, EdgeType)> = result
        .edges
        .iter()
        .map(|e| (e.target_id.as_str(), e.edge_type))
        .collect();
    assert!(targets.contains(&("App\\BaseController", EdgeType::Inherits)));
    assert!(targets.contains(&("App\\Handler", EdgeType::Implements)));
    assert!(targets.contains(&("App\\Loggable", EdgeType::Implements)));
}

#[test]
fn interface_and_trait_declarations_become_nodes() {
    let result = extract(
        r"<?php
namespace App;

interface Cache {}

trait Logging {}
",
    );
    let kinds: Vec<(&str, NodeType)> = result
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n.node_type))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("App\\Cache", NodeType::Interface),
            ("App\\Logging", NodeType::Trait),
        ]
    );
}

#[test]
fn reference_sites_attach_to_most_recent_class() {
    let result = extract(
        r"<?php
namespace App;

class First {}

class Second {
    public function run() {
        $x = new Widget();
        Helper::assist();
    }
}
",
    );
    let sites: Vec<(&str, &str, EdgeType)> = result
        .edges
        .iter()
        .map(|e| (e.source_id.as_str(), e.target_id.as_str(), e.edge_type))
        .collect();
    assert_eq!(
        sites,
        vec![
            ("App\\Second", "App\\Widget", EdgeType::Instantiation),
            ("App\\Second", "App\\Helper", EdgeType::MethodCall),
        ]
    );
}

#[test]
fn self_references_are_dropped_at_emission() {
    let result = extract(
        r"<?php
namespace App;

class Singleton {
    public function make() {
        return new Singleton();
    }
}
",
    );
    assert!(result.edges.is_empty());
}

#[test]
fn use_lines_emit_trait_edges_per_name() {
    let result = extract(
        r"<?php
namespace App;

class Service {
    use Logging, Caching;
}
",
    );
    let targets: Vec<&str> = result
        .edges
        .iter()
        .filter(|e| e.edge_type == EdgeType::UsesTrait)
        .map(|e| e.target_id.as_str())
        .collect();
    assert_eq!(targets, vec!["App\\Logging", "App\\Caching"]);
}

#[test]
fn file_without_class_emits_no_reference_edges() {
    let result = extract(
        r"<?php
$widget = new Widget();
Helper::assist();
",
    );
    assert!(result.nodes.is_empty());
    assert!(result.edges.is_empty());
}

#[test]
fn namespaces_disambiguate_same_named_classes() {
    let extractor = PhpExtractor::new(".");
    let first = extractor.extract_source(
        Path::new("core/User.php"),
        "<?php\nnamespace App\\Core;\nclass User {}\n",
    );
    let second = extractor.extract_source(
        Path::new("web/User.php"),
        "<?php\nnamespace App\\Web;\nclass User {}\n",
    );
    assert_eq!(first.nodes[0].id, "App\\Core\\User");
    assert_eq!(second.nodes[0].id, "App\\Web\\User");
    assert!(first.edges.is_empty());
    assert!(second.edges.is_empty());
}

#[test]
fn methods_are_collected_in_declaration_order() {
    let result = extract(
        r"<?php
class Repo {
    public function save() {}
    private function validate() {}
    public function delete() {}
}
",
    );
    assert_eq!(result.nodes[0].methods, vec!["save", "validate", "delete"]);
}

#[test]
fn missing_file_yields_empty_result() {
    let extractor = PhpExtractor::new(".");
    let result = extractor.extract_file(Path::new("does/not/exist.php"));
    assert!(result.nodes.is_empty());
    assert!(result.edges.is_empty());
}

#[test]
fn invalid_utf8_is_decoded_lossily() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("weird.php");
    let mut bytes = b"<?php\nclass Survivor {}\n".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe, 0xfd]);
    fs::write(&path, bytes).unwrap();

    let result = PhpExtractor::new(dir.path()).extract_file(&path);
    assert_eq!(result.nodes.len(), 1);
    assert_eq!(result.nodes[0].name, "Survivor");
}
