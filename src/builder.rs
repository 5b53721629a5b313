//! Assembling the final linter configuration.
//!
//! [`ConfigBuilder`] turns one set of normalized options into the
//! [`ResolvedConfig`] record handed to the analysis engine: it picks the base
//! preset, translates the style flags into rules, adds runtime-gated rules,
//! resolves `extends` entries to module paths and wires in the formatter when
//! `prettier` is on.

use crate::engines::{select_engine_rules, EngineConstraint, RuleSet};
use crate::error::Result;
use crate::formatter::{merge_formatter, FormatterOptions};
use crate::grouping::ConfigGroup;
use crate::module_resolver::ModuleResolver;
use crate::options::{Engines, Options};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Directory, relative to the working directory, the engine caches results in.
pub const CACHE_DIR: &str = ".xo-cache";

/// Preset used unless `esnext` is explicitly `false`.
pub const ESNEXT_PRESET: &str = "xo/esnext";

/// Preset used when `esnext` is `false`.
pub const DEFAULT_PRESET: &str = "xo";

/// Naming convention for shareable config packages.
const CONFIG_PREFIX: &str = "eslint-config";

const REACT_PLUGIN_MODULE: &str = "eslint-plugin-react";
const REACT_PLUGIN: &str = "react";
const PRETTIER: &str = "prettier";

/// How explicitly supplied `rules` combine with generated ones.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RuleMergeStrategy {
    /// Explicit rules are merged over generated rules key by key.
    #[default]
    Merge,
    /// Explicit rules, when present, replace generated rules entirely.
    Replace,
}

impl fmt::Display for RuleMergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for RuleMergeStrategy {
    type Err = crate::error::XoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "replace" => Ok(Self::Replace),
            other => Err(crate::error::XoError::invalid_input_with_arg(
                "expected `merge` or `replace`",
                other,
            )),
        }
    }
}

/// Settings shared by every file the config applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseConfig {
    /// Preset first, then resolved `extends` entries.
    pub extends: Vec<String>,

    /// Custom parser module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,

    /// Shared rule settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,

    /// Language options for the parser.
    pub parser_options: Value,
}

/// Configuration ready for the analysis engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    /// Always `false`: per-directory linter config files are ignored.
    pub use_eslintrc: bool,
    /// Always `true`.
    pub cache: bool,
    /// `<cwd>/.xo-cache`.
    pub cache_location: PathBuf,
    /// Preset, extends, parser and settings.
    pub base_config: BaseConfig,
    /// Rule name to severity or `[severity, ...options]`.
    pub rules: RuleSet,
    /// Environments.
    pub envs: Vec<String>,
    /// Global variable names.
    pub globals: Vec<String>,
    /// Plugins to load.
    pub plugins: Vec<String>,
    /// Patterns of files to skip.
    pub ignore_pattern: Vec<String>,
    /// Additional file extensions.
    pub extensions: Vec<String>,
    /// Apply automatic fixes.
    pub fix: bool,
}

/// A resolved configuration with the files it applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGroup {
    /// Override hash shared by every member.
    pub hash: u64,
    /// Member paths, in input order.
    pub paths: Vec<PathBuf>,
    /// Configuration for the members.
    pub config: ResolvedConfig,
}

fn parser_options() -> Value {
    json!({
        "ecmaVersion": 2018,
        "sourceType": "module",
        "ecmaFeatures": {
            "jsx": true,
            "experimentalObjectRestSpread": true,
        },
    })
}

/// Whether an `extends` entry names a file rather than a package.
fn is_path_like(name: &str) -> bool {
    name.starts_with("./") || name.starts_with("../") || Path::new(name).is_absolute()
}

/// Applies the shareable config naming convention to a bare package name.
///
/// `foo` becomes `eslint-config-foo`, `@scope` becomes `@scope/eslint-config`
/// and `@scope/foo` becomes `@scope/eslint-config-foo`. Names already
/// following the convention are returned unchanged.
#[must_use]
pub fn config_module_name(name: &str) -> String {
    if let Some(scoped) = name.strip_prefix('@') {
        return match scoped.split_once('/') {
            None => format!("@{scoped}/{CONFIG_PREFIX}"),
            Some((scope, rest)) if rest.starts_with(CONFIG_PREFIX) => {
                format!("@{scope}/{rest}")
            }
            Some((scope, rest)) => format!("@{scope}/{CONFIG_PREFIX}-{rest}"),
        };
    }

    if name.starts_with(&format!("{CONFIG_PREFIX}-")) {
        name.to_string()
    } else {
        format!("{CONFIG_PREFIX}-{name}")
    }
}

fn push_unique(items: &mut Vec<String>, item: &str) {
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
}

/// Builds [`ResolvedConfig`]s for one working directory.
pub struct ConfigBuilder<'r> {
    cwd: PathBuf,
    resolver: &'r dyn ModuleResolver,
    rules_strategy: RuleMergeStrategy,
    formatter: Option<FormatterOptions>,
}

impl fmt::Debug for ConfigBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("cwd", &self.cwd)
            .field("rules_strategy", &self.rules_strategy)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

impl<'r> ConfigBuilder<'r> {
    /// Creates a builder resolving modules from `cwd` with `resolver`.
    pub fn new(cwd: impl Into<PathBuf>, resolver: &'r dyn ModuleResolver) -> Self {
        Self {
            cwd: cwd.into(),
            resolver,
            rules_strategy: RuleMergeStrategy::default(),
            formatter: None,
        }
    }

    /// Sets how explicit `rules` combine with generated ones.
    #[must_use]
    pub fn rules_strategy(mut self, strategy: RuleMergeStrategy) -> Self {
        self.rules_strategy = strategy;
        self
    }

    /// Sets the external formatter's own settings, used when `prettier` is on.
    #[must_use]
    pub fn formatter_options(mut self, formatter: FormatterOptions) -> Self {
        self.formatter = Some(formatter);
        self
    }

    fn resolve_extends(&self, name: &str, cwd: &Path) -> Result<String> {
        if name.starts_with("plugin:") || is_path_like(name) {
            return Ok(name.to_string());
        }

        let module = config_module_name(name);
        let resolved = self.resolver.resolve(&module, cwd)?;
        tracing::trace!(name, module, resolved = %resolved.display(), "Resolved extends entry");
        Ok(resolved.to_string_lossy().into_owned())
    }

    /// Builds the engine configuration for `opts`.
    ///
    /// `opts.cwd`, when set, takes precedence over the builder's directory.
    ///
    /// # Errors
    ///
    /// Returns `ModuleNotFound` for an unresolvable `extends` entry, a
    /// `ConfigError` for a malformed engine range, and a `ConfigConflictError`
    /// when `prettier` is on and the style flags disagree with the formatter
    /// settings.
    #[tracing::instrument(level = "debug", skip_all, err)]
    pub fn build(&self, opts: &Options) -> Result<ResolvedConfig> {
        let cwd = opts.cwd.as_deref().unwrap_or(&self.cwd);

        let preset = if opts.esnext == Some(false) {
            DEFAULT_PRESET
        } else {
            ESNEXT_PRESET
        };
        tracing::debug!(preset, "Selected base preset");

        let mut rules = RuleSet::new();
        let mut plugins = opts.plugins.clone().unwrap_or_default();

        if let Some(width) = opts.space.and_then(|space| space.indent_width()) {
            rules.insert("indent".into(), json!(["error", width, { "SwitchCase": 1 }]));

            if self.resolver.is_resolvable(REACT_PLUGIN_MODULE, cwd) {
                push_unique(&mut plugins, REACT_PLUGIN);
                rules.insert("react/jsx-indent".into(), json!(["error", width]));
                rules.insert("react/jsx-indent-props".into(), json!(["error", width]));
            }
        }

        if opts.semicolon == Some(false) {
            rules.insert("semi".into(), json!(["error", "never"]));
            rules.insert(
                "semi-spacing".into(),
                json!(["error", { "before": false, "after": true }]),
            );
        }

        if let Some(engines @ Engines::Targets(_)) = &opts.engines {
            let constraint = EngineConstraint::from_engines(engines);
            rules.extend(select_engine_rules(constraint.as_ref())?);
        }

        let prettier = opts.prettier == Some(true);
        if prettier {
            let formatter = merge_formatter(opts, &self.formatter.clone().unwrap_or_default())?;
            push_unique(&mut plugins, PRETTIER);
            rules.insert(
                "prettier/prettier".into(),
                json!(["error", serde_json::to_value(formatter)?]),
            );
        }

        let rules = match (self.rules_strategy, &opts.rules) {
            (RuleMergeStrategy::Replace, Some(explicit)) => explicit.clone(),
            (RuleMergeStrategy::Merge, Some(explicit)) => {
                rules.extend(explicit.clone());
                rules
            }
            (_, None) => rules,
        };

        let mut extends = vec![preset.to_string()];
        for name in opts.extends.iter().flatten() {
            extends.push(self.resolve_extends(name, cwd)?);
        }
        if prettier {
            extends.push(PRETTIER.to_string());
        }

        Ok(ResolvedConfig {
            use_eslintrc: false,
            cache: true,
            cache_location: cwd.join(CACHE_DIR),
            base_config: BaseConfig {
                extends,
                parser: opts.parser.clone(),
                settings: opts.settings.clone(),
                parser_options: parser_options(),
            },
            rules,
            envs: opts.envs.clone().unwrap_or_default(),
            globals: opts.globals.clone().unwrap_or_default(),
            plugins,
            ignore_pattern: opts.ignores.clone().unwrap_or_default(),
            extensions: opts.extensions.clone().unwrap_or_default(),
            fix: opts.fix.unwrap_or(false),
        })
    }
}

impl ConfigBuilder<'_> {
    /// Builds one configuration per group, keeping the group order.
    ///
    /// # Errors
    ///
    /// Fails on the first group that cannot be built; see [`Self::build`].
    pub fn build_groups(&self, groups: &[ConfigGroup]) -> Result<Vec<ResolvedGroup>> {
        groups
            .iter()
            .map(|group| {
                Ok(ResolvedGroup {
                    hash: group.hash,
                    paths: group.paths.clone(),
                    config: self.build(&group.opts)?,
                })
            })
            .collect()
    }
}

/// Builds the engine configuration for `opts` with the default rule strategy
/// and no formatter settings.
///
/// # Errors
///
/// See [`ConfigBuilder::build`].
pub fn build_config(
    opts: &Options,
    cwd: &Path,
    resolver: &dyn ModuleResolver,
) -> Result<ResolvedConfig> {
    ConfigBuilder::new(cwd, resolver).build(opts)
}
