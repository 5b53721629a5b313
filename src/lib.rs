//! # xoopt - deterministic lint option resolution
//!
//! xoopt turns loosely written lint options into concrete, per-file linter
//! configurations. Options can come from a project's `package.json`, from
//! an explicit options record, and from path-scoped overrides; a separate
//! formatter may carry its own, possibly conflicting, style settings.
//!
//! ## Architecture
//!
//! - [`options`] - Canonicalizing loosely shaped options and merging them
//! - [`overrides`] - Matching path-scoped override rules, as a bitmask
//! - [`grouping`] - Partitioning files by the overrides that apply to them
//! - [`engines`] - Rules switched on by the target runtime version
//! - [`formatter`] - Reconciling style flags with formatter settings
//! - [`pkg_conf`] - Options stored in the nearest `package.json`
//! - [`module_resolver`] - Locating shareable configs in `node_modules`
//! - [`builder`] - Producing the final configuration record
//! - [`config`] - The tool's own `.xoopt.toml` settings
//! - [`file_utils`] - Expanding path arguments into files
//! - [`report`] - Rendering results as JSON, YAML, tables or text
//! - [`cli`] - Command-line argument definitions
//! - [`error`] - Centralized error types for the crate
//!
//! ## Usage as a Library
//!
//! ```rust,no_run
//! use serde_json::json;
//! use std::path::{Path, PathBuf};
//! use xoopt_core::{group_configs, normalize, ConfigBuilder, NodeModulesResolver, OverrideRule};
//!
//! # fn main() -> xoopt_core::Result<()> {
//! let base = normalize(json!({ "space": 2 }).as_object().unwrap())?;
//! let overrides: Vec<OverrideRule> =
//!     serde_json::from_value(json!([{ "files": "test/**", "env": "mocha" }]))?;
//!
//! let paths = vec![PathBuf::from("src/index.js"), PathBuf::from("test/index.js")];
//! let groups = group_configs(&paths, &base, &overrides)?;
//!
//! let resolver = NodeModulesResolver;
//! let builder = ConfigBuilder::new(Path::new("/project"), &resolver);
//! for resolved in builder.build_groups(&groups)? {
//!     println!("{:?}: {:?}", resolved.paths, resolved.config.rules);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All functions that can fail return [`Result<T>`], which is a type alias for
//! `std::result::Result<T, XoError>`. See the [`error`] module for details on
//! error types and handling.

// Module declarations
pub mod builder;
pub mod cli;
pub mod config;
pub mod engines;
pub mod error;
pub mod file_utils;
pub mod formatter;
pub mod grouping;
pub mod module_resolver;
pub mod options;
pub mod overrides;
pub mod pkg_conf;
pub mod report;

// Public API exports
pub use crate::builder::{
    build_config, BaseConfig, ConfigBuilder, ResolvedConfig, ResolvedGroup, RuleMergeStrategy,
};
pub use crate::engines::{select_engine_rules, EngineConstraint, RuleSet};
pub use crate::formatter::{merge_formatter, FormatterOptions, TrailingComma};
pub use crate::grouping::{group_by_options, group_configs, ConfigGroup};
pub use crate::module_resolver::{ModuleResolver, NodeModulesResolver};
pub use crate::options::{normalize, Engines, Mergeable, Options, RawOptions, Space};
pub use crate::overrides::{find_applicable_overrides, ApplicableOverrides, OverrideRule, OverrideSet};
pub use crate::pkg_conf::{merge_with_pkg_conf, Manifest, ManifestLoader, PackageJsonLoader};

// Config exports
pub use crate::config::{
    load_config, load_config_from_path, merge_resolve_args, merge_target_args, GeneralConfig,
    ResolveConfig, XooptConfig,
};

// CLI exports
pub use crate::cli::{Cli, Commands, OutputFormat};

// Error exports
pub use crate::error::{Result, XoError, XoError as Error};
