use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extensions linted when no others are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["js"];

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", ".xo-cache"];

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DEFAULT_EXTENSIONS.contains(&ext) || extensions.iter().any(|e| e == ext))
}

/// Expands path arguments into the files to lint.
///
/// Relative arguments are taken relative to `cwd`; no arguments means `cwd`
/// itself. Files named explicitly are kept whatever their extension.
/// Directories are walked in file-name order, keeping files with a default or
/// configured extension and skipping `node_modules`, `.git` and the cache
/// directory. Duplicates are dropped, first occurrence wins.
///
/// # Errors
/// - If a path does not exist.
/// - If directory traversal fails.
pub fn collect_lint_targets(
    paths: &[PathBuf],
    cwd: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let roots: Vec<PathBuf> = if paths.is_empty() {
        vec![cwd.to_path_buf()]
    } else {
        paths.iter().map(|p| cwd.join(p)).collect()
    };

    let mut out_files = Vec::new();
    for root in &roots {
        if root.is_file() {
            out_files.push(root.clone());
            continue;
        }
        if !root.is_dir() {
            anyhow::bail!("Path '{}' does not exist", root.display());
        }

        for entry_result in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e))
        {
            let entry = entry_result
                .with_context(|| format!("Error walking directory entry in '{}'", root.display()))?;
            if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
                out_files.push(entry.into_path());
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    out_files.retain(|path| seen.insert(path.clone()));
    tracing::debug!(files = out_files.len(), "Collected lint targets");
    Ok(out_files)
}
