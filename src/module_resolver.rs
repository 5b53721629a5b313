//! Locating shareable configs and plugins on disk.

use crate::error::{Result, XoError};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves a module name to the file that would be loaded for it.
pub trait ModuleResolver {
    /// Resolves `name` as seen from `cwd`.
    ///
    /// # Errors
    ///
    /// Returns `ModuleNotFound` if nothing by that name is installed.
    fn resolve(&self, name: &str, cwd: &Path) -> Result<PathBuf>;

    /// Whether `name` can be resolved from `cwd`.
    fn is_resolvable(&self, name: &str, cwd: &Path) -> bool {
        self.resolve(name, cwd).is_ok()
    }
}

/// Looks modules up in `node_modules` directories, walking upward from the
/// working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesResolver;

impl NodeModulesResolver {
    /// Entry point of an installed package directory.
    fn package_entry(dir: &Path) -> Option<PathBuf> {
        let main = fs::read_to_string(dir.join("package.json"))
            .ok()
            .and_then(|content| serde_json::from_str::<Value>(&content).ok())
            .and_then(|manifest| manifest.get("main").and_then(Value::as_str).map(String::from));

        let candidates = main
            .iter()
            .flat_map(|main| {
                let main = dir.join(main);
                [main.clone(), main.with_extension("js"), main.join("index.js")]
            })
            .chain([dir.join("index.js")]);

        candidates.into_iter().find(|candidate| candidate.is_file())
    }
}

impl ModuleResolver for NodeModulesResolver {
    fn resolve(&self, name: &str, cwd: &Path) -> Result<PathBuf> {
        for dir in cwd.ancestors() {
            let base = dir.join("node_modules").join(name);

            if base.is_dir()
                && let Some(entry) = Self::package_entry(&base)
            {
                tracing::trace!(name, entry = %entry.display(), "Resolved module");
                return Ok(entry);
            }

            let file = base.with_extension("js");
            if file.is_file() {
                return Ok(file);
            }
        }

        Err(XoError::module_not_found(name, cwd.to_path_buf()))
    }
}
