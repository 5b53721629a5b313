//! Options stored in the nearest `package.json`.
//!
//! A project can keep its lint options under a key of its manifest
//! (`"xo": {...}`). The nearest manifest supplies the base options; whatever
//! the caller passes explicitly wins over it field by field.
//!
//! # Lookup rules
//!
//! Manifests are searched from the working directory upward:
//!
//! - a manifest with the key set to `false` is skipped;
//! - any other manifest stops the search, yielding `{}` when it has no key;
//! - `engines` is taken from the nearest manifest, skipped or not, and is
//!   unset when that manifest does not declare it.
//!
//! Finding no manifest at all is not an error.

use crate::error::{Result, XoError};
use crate::formatter::FormatterOptions;
use crate::options::{normalize, Engines, Options, RawOptions};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Manifest key the options are stored under by default.
pub const DEFAULT_MANIFEST_KEY: &str = "xo";

/// Manifest key holding the external formatter's settings.
pub const FORMATTER_KEY: &str = "prettier";

/// Options and engines read from the manifests above a directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// Manifest the options were read from, or the nearest manifest when
    /// every manifest has its options switched off.
    pub path: PathBuf,
    /// Stored options, exactly as written.
    pub options: RawOptions,
    /// Target runtimes declared by the nearest manifest.
    pub engines: Option<BTreeMap<String, String>>,
}

/// Source of stored options for a working directory.
pub trait ManifestLoader {
    /// Loads the nearest applicable manifest above `cwd`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest exists but cannot be read or parsed.
    fn load_nearest_manifest(&self, cwd: &Path) -> Result<Option<Manifest>>;
}

/// Loads options from `package.json` files on disk.
#[derive(Debug, Clone)]
pub struct PackageJsonLoader {
    key: String,
}

impl Default for PackageJsonLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_KEY)
    }
}

impl PackageJsonLoader {
    /// Creates a loader reading options from `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// The manifest key options are read from.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the formatter settings from the nearest manifest declaring them.
    ///
    /// # Errors
    ///
    /// Returns an error if a manifest cannot be parsed or its formatter
    /// settings have the wrong shape.
    pub fn load_formatter_options(&self, cwd: &Path) -> Result<Option<FormatterOptions>> {
        for dir in cwd.ancestors() {
            let path = dir.join(MANIFEST_FILE);
            let Some(mut manifest) = read_manifest(&path)? else {
                continue;
            };
            if let Some(value @ Value::Object(_)) = manifest.remove(FORMATTER_KEY) {
                tracing::debug!(path = %path.display(), "Found formatter settings");
                let options = serde_json::from_value(value).map_err(|err| {
                    XoError::parse_error_with_file(path, "invalid formatter settings", err)
                })?;
                return Ok(Some(options));
            }
        }
        Ok(None)
    }
}

/// Reads a manifest as a JSON object, or `None` if it does not exist.
fn read_manifest(path: &Path) -> Result<Option<RawOptions>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|err| XoError::io_error_with_source("read manifest", path.to_path_buf(), err))?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(XoError::ParseError {
            file: Some(path.to_path_buf()),
            context: "manifest is not a JSON object".to_string(),
            source: None,
        }),
        Err(err) => Err(XoError::parse_error_with_file(
            path.to_path_buf(),
            "invalid JSON",
            err,
        )),
    }
}

fn parse_engines(path: &Path, value: Value) -> Result<BTreeMap<String, String>> {
    serde_json::from_value(value).map_err(|err| {
        XoError::parse_error_with_file(path.to_path_buf(), "invalid `engines` field", err)
    })
}

impl ManifestLoader for PackageJsonLoader {
    #[tracing::instrument(level = "debug", skip(self), fields(key = %self.key), err)]
    fn load_nearest_manifest(&self, cwd: &Path) -> Result<Option<Manifest>> {
        // Engines always come from the nearest manifest, even one whose
        // options are switched off.
        let mut nearest: Option<(PathBuf, Option<BTreeMap<String, String>>)> = None;

        for dir in cwd.ancestors() {
            let path = dir.join(MANIFEST_FILE);
            let Some(mut manifest) = read_manifest(&path)? else {
                continue;
            };

            if nearest.is_none() {
                let engines = match manifest.remove("engines") {
                    Some(value) => Some(parse_engines(&path, value)?),
                    None => None,
                };
                nearest = Some((path.clone(), engines));
            }

            let options = match manifest.remove(&self.key) {
                Some(Value::Bool(false)) => {
                    tracing::debug!(path = %path.display(), "Skipping manifest with options switched off");
                    continue;
                }
                None => RawOptions::new(),
                Some(Value::Object(stored)) => stored,
                Some(other) => {
                    return Err(XoError::config_error_with_path(
                        format!("`{}` must be an object or false, got {other}", self.key),
                        path,
                    ));
                }
            };

            tracing::debug!(path = %path.display(), "Found stored options");
            let engines = nearest.and_then(|(_, engines)| engines);
            return Ok(Some(Manifest {
                path,
                options,
                engines,
            }));
        }

        Ok(nearest.map(|(path, engines)| Manifest {
            path,
            options: RawOptions::new(),
            engines,
        }))
    }
}

/// Merges explicit options over the options stored in the nearest manifest.
///
/// The caller's fields replace the stored ones wholesale, so an explicit
/// `engines: false` suppresses any declared engines. `engines` defaults to an
/// empty mapping and `cwd` is always set on the result.
///
/// # Errors
///
/// Returns an error if a manifest cannot be read or its stored options are
/// malformed.
pub fn merge_with_pkg_conf(
    cwd: &Path,
    opts: &Options,
    loader: &dyn ManifestLoader,
) -> Result<Options> {
    let mut base = match loader.load_nearest_manifest(cwd)? {
        Some(manifest) => {
            let mut stored = normalize(&manifest.options).map_err(|err| match err {
                XoError::ConfigError { message, source, .. } => XoError::ConfigError {
                    message,
                    path: Some(manifest.path.clone()),
                    source,
                },
                other => other,
            })?;
            stored.engines = Some(Engines::Targets(manifest.engines.unwrap_or_default()));
            stored
        }
        None => Options {
            engines: Some(Engines::Targets(BTreeMap::new())),
            ..Options::default()
        },
    };
    base.cwd = None;

    let mut merged = base.overlay(opts);
    merged.cwd = Some(cwd.to_path_buf());
    Ok(merged)
}
