//! Deterministic enumeration of candidate source files

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// File suffix recognized by the current corpus.
pub const SOURCE_EXTENSION: &str = ".php";

/// Collect every source file under `root` in a stable order.
///
/// Entries are visited lexicographically within each directory, so two
/// scans over the same filesystem state always yield the same list.
/// Hidden files are candidates like any other; ignore files are not
/// consulted. `max_files` caps the result for legacy callers.
pub fn scan(root: &Path, max_files: Option<usize>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(SOURCE_EXTENSION) {
            files.push(entry.into_path());
        }
    }
    if let Some(cap) = max_files {
        files.truncate(cap);
    }
    files
}
