//! Fully-qualified identifier resolution

use std::path::Path;

/// Separator used in fully-qualified component ids.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Build a fully-qualified, collision-resistant component id.
///
/// Resolution order:
/// 1. A raw name already containing the separator is returned unchanged.
/// 2. A declared namespace yields `Namespace\Name`.
/// 3. Otherwise the file's directory relative to the analysis root stands
///    in as a namespace-like prefix, so two same-named classes in
///    different directories never collide. Files directly under the root
///    keep the bare name.
pub fn qualify(raw: &str, namespace: Option<&str>, file_path: &Path, root_path: &Path) -> String {
    let name = raw.trim();
    if name.contains(NAMESPACE_SEPARATOR) {
        return name.to_string();
    }
    if let Some(ns) = namespace {
        return format!("{ns}{NAMESPACE_SEPARATOR}{name}");
    }
    let dir = file_path.parent().unwrap_or_else(|| Path::new(""));
    let rel = dir.strip_prefix(root_path).unwrap_or(dir);
    if rel.as_os_str().is_empty() || rel == Path::new(".") {
        return name.to_string();
    }
    let prefix: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!(
        "{}{NAMESPACE_SEPARATOR}{name}",
        prefix.join(&NAMESPACE_SEPARATOR.to_string())
    )
}
