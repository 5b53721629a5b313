//! Configuration file support for xoopt.
//!
//! This module provides functionality to load the tool's own settings from a
//! TOML file and merge them with command-line arguments. CLI arguments take
//! precedence over config file values.
//!
//! These settings are about running the tool (output format, thread count,
//! manifest key). The lint options themselves live in `package.json` and in
//! the options file passed on the command line.

use crate::builder::RuleMergeStrategy;
use crate::cli::{OutputFormat, ResolveArgs, TargetArgs};
use crate::error::{Result, XoError};
use crate::pkg_conf::DEFAULT_MANIFEST_KEY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for.
const DEFAULT_CONFIG_FILES: &[&str] = &[".xoopt.toml", "xoopt.toml"];

/// Main configuration structure representing an xoopt settings file.
///
/// Values are applied in this order:
/// 1. CLI arguments (highest priority)
/// 2. Config file values
/// 3. Default values (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct XooptConfig {
    /// General settings that apply to all commands.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Settings for grouping and resolving.
    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// General configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Enable verbose output.
    #[serde(default)]
    pub verbose: bool,

    /// Output format: `json`, `yaml`, `table` or `text`.
    pub output: Option<String>,

    /// Number of threads used to match overrides.
    pub jobs: Option<usize>,
}

/// Resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ResolveConfig {
    /// `merge` or `replace`.
    pub rules_strategy: Option<String>,

    /// Manifest key holding stored options. Defaults to `xo`.
    pub manifest_key: Option<String>,

    /// Extra file extensions to lint.
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl XooptConfig {
    /// Manifest key to read stored options from.
    #[must_use]
    pub fn manifest_key(&self) -> &str {
        self.resolve
            .manifest_key
            .as_deref()
            .unwrap_or(DEFAULT_MANIFEST_KEY)
    }
}

/// Load configuration from a specific file path.
///
/// # Returns
///
/// Returns an `XooptConfig` if the file exists and can be parsed.
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns an error if the file exists but cannot be parsed.
pub fn load_config_from_path(path: &Path) -> Result<Option<XooptConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|err| XoError::io_error_with_source("read config", path.to_path_buf(), err))?;

    let config: XooptConfig = toml::from_str(&content).map_err(|err| XoError::ConfigError {
        message: format!("Failed to parse TOML: {err}"),
        path: Some(path.to_path_buf()),
        source: Some(Box::new(err)),
    })?;

    Ok(Some(config))
}

/// Discover and load configuration, searching `cwd` and its ancestors.
///
/// # Returns
///
/// Returns the path and configuration of the first file found, or `None`.
pub fn discover_and_load_config(cwd: &Path) -> Result<Option<(PathBuf, XooptConfig)>> {
    for dir in cwd.ancestors() {
        for config_name in DEFAULT_CONFIG_FILES {
            let config_path = dir.join(config_name);
            if let Some(config) = load_config_from_path(&config_path)? {
                tracing::debug!(path = %config_path.display(), "Loaded settings file");
                return Ok(Some((config_path, config)));
            }
        }
    }

    Ok(None)
}

/// Load configuration from a specified path or discover it from `cwd`.
///
/// An explicitly named file that does not exist is an error.
pub fn load_config(config_path: Option<&Path>, cwd: &Path) -> Result<Option<(PathBuf, XooptConfig)>> {
    match config_path {
        Some(path) => match load_config_from_path(path)? {
            Some(config) => Ok(Some((path.to_path_buf(), config))),
            None => Err(XoError::invalid_input_with_arg(
                "config file not found",
                path.display().to_string(),
            )),
        },
        None => discover_and_load_config(cwd),
    }
}

/// Parse an output format name.
fn parse_output_format(s: &str) -> Option<OutputFormat> {
    match s.to_lowercase().as_str() {
        "json" => Some(OutputFormat::Json),
        "yaml" => Some(OutputFormat::Yaml),
        "table" => Some(OutputFormat::Table),
        "text" => Some(OutputFormat::Text),
        _ => None,
    }
}

/// Merge target CLI args with config file values.
///
/// # Errors
///
/// Returns `InvalidInput` if the config names an unknown output format.
pub fn merge_target_args(cli_args: &TargetArgs, config: &XooptConfig) -> Result<TargetArgs> {
    let mut merged = cli_args.clone();

    if merged.output.is_none()
        && let Some(output) = &config.general.output
    {
        merged.output = Some(parse_output_format(output).ok_or_else(|| {
            XoError::invalid_input_with_arg("unknown output format", output.clone())
        })?);
    }

    if merged.jobs.is_none() {
        merged.jobs = config.general.jobs;
    }

    if merged.manifest_key.is_none() {
        merged.manifest_key = config.resolve.manifest_key.clone();
    }

    Ok(merged)
}

/// Merge resolve CLI args with config file values.
///
/// # Errors
///
/// Returns `InvalidInput` if the config names an unknown output format or
/// rules strategy.
pub fn merge_resolve_args(cli_args: &ResolveArgs, config: &XooptConfig) -> Result<ResolveArgs> {
    let mut merged = cli_args.clone();
    merged.target = merge_target_args(&cli_args.target, config)?;

    if merged.rules_strategy.is_none()
        && let Some(strategy) = &config.resolve.rules_strategy
    {
        merged.rules_strategy = Some(strategy.parse::<RuleMergeStrategy>()?);
    }

    Ok(merged)
}
