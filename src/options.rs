//! Option normalization and merging.
//!
//! Users write options loosely: `env: "node"` and `envs: ["node"]` mean the
//! same thing, and `rule` is accepted for `rules`. [`normalize`] runs a single
//! canonicalization pass over the raw record, driven by [`OPTION_ALIASES`],
//! and then deserializes it into the typed [`Options`] shape every later
//! stage works on.
//!
//! Unset and explicitly empty stay distinguishable: a field that never
//! appeared is `None`, never an empty container. Only [`Options::empty`]
//! materializes empty containers, for consumers that want every category
//! present.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use xoopt_core::options::normalize;
//!
//! # fn main() -> xoopt_core::Result<()> {
//! let raw = json!({ "env": "node", "rule": { "semi": "off" } });
//! let opts = normalize(raw.as_object().unwrap())?;
//! assert_eq!(opts.envs, Some(vec!["node".to_string()]));
//! assert!(opts.rules.unwrap().contains_key("semi"));
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, XoError};
use crate::overrides::OverrideRule;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A loosely shaped options record, exactly as a human wrote it.
pub type RawOptions = Map<String, Value>;

/// Shape a canonical field must take after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasShape {
    /// Scalars are wrapped into a one-element sequence.
    Sequence,
    /// The value is a mapping and is only renamed.
    Mapping,
}

/// Singular name, canonical plural name and shape of every aliased option.
pub const OPTION_ALIASES: &[(&str, &str, AliasShape)] = &[
    ("env", "envs", AliasShape::Sequence),
    ("global", "globals", AliasShape::Sequence),
    ("ignore", "ignores", AliasShape::Sequence),
    ("plugin", "plugins", AliasShape::Sequence),
    ("rule", "rules", AliasShape::Mapping),
    ("setting", "settings", AliasShape::Mapping),
    ("extend", "extends", AliasShape::Sequence),
    ("extension", "extensions", AliasShape::Sequence),
];

/// Indentation preference: `true` for two spaces, a number for that width,
/// `false` for tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Space {
    /// `space: true` or `space: false`.
    Enabled(bool),
    /// `space: 4`.
    Width(u32),
}

impl Space {
    /// Indent width to enforce, if spaces are requested at all.
    ///
    /// `space: 0` is treated like `false`.
    #[must_use]
    pub const fn indent_width(self) -> Option<u32> {
        match self {
            Self::Enabled(true) => Some(2),
            Self::Width(n) if n > 0 => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled(b) => write!(f, "{b}"),
            Self::Width(n) => write!(f, "{n}"),
        }
    }
}

/// Target runtimes, as in a `package.json` `engines` field.
///
/// `engines: false` disables runtime gating entirely, even when a manifest
/// declares engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Engines {
    /// `engines: false` (or the meaningless `true`).
    Flag(bool),
    /// Runtime name to version range, e.g. `{"node": ">=6"}`.
    Targets(BTreeMap<String, String>),
}

impl Engines {
    /// Returns the version range declared for `runtime`, if any.
    #[must_use]
    pub fn range_for(&self, runtime: &str) -> Option<&str> {
        match self {
            Self::Targets(map) => map.get(runtime).map(String::as_str),
            Self::Flag(_) => None,
        }
    }
}

/// Canonical, typed options.
///
/// Fields the tool does not know about are kept in `extra` and survive every
/// merge untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// Working directory the options apply to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Environments (`browser`, `node`, `mocha`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envs: Option<Vec<String>>,

    /// Additional global variable names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub globals: Option<Vec<String>>,

    /// Glob patterns of files to ignore.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignores: Option<Vec<String>>,

    /// Extra linter plugins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,

    /// Shareable configs to extend, in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<Vec<String>>,

    /// Additional file extensions to lint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    /// Rule name to severity or `[severity, ...options]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Map<String, Value>>,

    /// Shared settings handed to every rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,

    /// Use the `esnext` preset (default when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub esnext: Option<bool>,

    /// Indentation preference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<Space>,

    /// Require semicolons (default when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semicolon: Option<bool>,

    /// Delegate formatting to the external formatter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prettier: Option<bool>,

    /// Custom parser module name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,

    /// Target runtimes used to gate optional rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engines: Option<Engines>,

    /// Apply automatic fixes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<bool>,

    /// Path-scoped partial options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<OverrideRule>>,

    /// Unknown fields, passed through verbatim.
    #[serde(flatten)]
    pub extra: RawOptions,
}

impl Options {
    /// Options with every known plural category present and empty.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            envs: Some(Vec::new()),
            globals: Some(Vec::new()),
            ignores: Some(Vec::new()),
            plugins: Some(Vec::new()),
            extends: Some(Vec::new()),
            extensions: Some(Vec::new()),
            rules: Some(Map::new()),
            settings: Some(Map::new()),
            ..Self::default()
        }
    }

    /// Converts back into the loosely shaped record form.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be represented as a JSON object.
    pub fn to_raw(&self) -> Result<RawOptions> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(XoError::config_error(format!(
                "options serialized to a non-object value: {other}"
            ))),
        }
    }

    /// Shallow overlay: every field set in `other` replaces the field in
    /// `self` wholesale. Unknown fields are overlaid key by key.
    #[must_use]
    pub fn overlay(&self, other: &Self) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(other.extra.clone());

        Self {
            cwd: other.cwd.clone().or_else(|| self.cwd.clone()),
            envs: other.envs.clone().or_else(|| self.envs.clone()),
            globals: other.globals.clone().or_else(|| self.globals.clone()),
            ignores: other.ignores.clone().or_else(|| self.ignores.clone()),
            plugins: other.plugins.clone().or_else(|| self.plugins.clone()),
            extends: other.extends.clone().or_else(|| self.extends.clone()),
            extensions: other.extensions.clone().or_else(|| self.extensions.clone()),
            rules: other.rules.clone().or_else(|| self.rules.clone()),
            settings: other.settings.clone().or_else(|| self.settings.clone()),
            esnext: other.esnext.or(self.esnext),
            space: other.space.or(self.space),
            semicolon: other.semicolon.or(self.semicolon),
            prettier: other.prettier.or(self.prettier),
            parser: other.parser.clone().or_else(|| self.parser.clone()),
            engines: other.engines.clone().or_else(|| self.engines.clone()),
            fix: other.fix.or(self.fix),
            overrides: other.overrides.clone().or_else(|| self.overrides.clone()),
            extra,
        }
    }
}

/// Trait for types that can be merged with another instance of the same type.
///
/// Unlike [`Options::overlay`], merging combines containers: sequences are
/// unioned in order and mappings are merged key by key, with `other` winning
/// on scalar conflicts.
pub trait Mergeable: Sized {
    /// Merges this value with another, with `other` taking precedence.
    #[must_use]
    fn merge(&self, other: &Self) -> Self;
}

impl Mergeable for Options {
    fn merge(&self, other: &Self) -> Self {
        let engines = match (&self.engines, &other.engines) {
            (Some(Engines::Targets(base)), Some(Engines::Targets(over))) => {
                let mut targets = base.clone();
                targets.extend(over.clone());
                Some(Engines::Targets(targets))
            }
            (base, over) => over.clone().or_else(|| base.clone()),
        };

        Self {
            cwd: other.cwd.clone().or_else(|| self.cwd.clone()),
            envs: union_sequences(&self.envs, &other.envs),
            globals: union_sequences(&self.globals, &other.globals),
            ignores: union_sequences(&self.ignores, &other.ignores),
            plugins: union_sequences(&self.plugins, &other.plugins),
            extends: union_sequences(&self.extends, &other.extends),
            extensions: union_sequences(&self.extensions, &other.extensions),
            rules: merge_mappings(&self.rules, &other.rules),
            settings: merge_mappings(&self.settings, &other.settings),
            esnext: other.esnext.or(self.esnext),
            space: other.space.or(self.space),
            semicolon: other.semicolon.or(self.semicolon),
            prettier: other.prettier.or(self.prettier),
            parser: other.parser.clone().or_else(|| self.parser.clone()),
            engines,
            fix: other.fix.or(self.fix),
            overrides: other.overrides.clone().or_else(|| self.overrides.clone()),
            extra: merge_mappings(&Some(self.extra.clone()), &Some(other.extra.clone()))
                .unwrap_or_default(),
        }
    }
}

fn union_sequences(base: &Option<Vec<String>>, other: &Option<Vec<String>>) -> Option<Vec<String>> {
    match (base, other) {
        (Some(base), Some(other)) => {
            let mut merged = base.clone();
            for item in other {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
            Some(merged)
        }
        (base, other) => other.clone().or_else(|| base.clone()),
    }
}

fn merge_mappings(
    base: &Option<Map<String, Value>>,
    other: &Option<Map<String, Value>>,
) -> Option<Map<String, Value>> {
    match (base, other) {
        (Some(base), Some(other)) => {
            let mut merged = base.clone();
            merged.extend(other.clone());
            Some(merged)
        }
        (base, other) => other.clone().or_else(|| base.clone()),
    }
}

/// JavaScript-style truthiness, used to pick between alias spellings.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Collapses alias spellings into their canonical plural form.
///
/// A truthy plural value wins over the singular one; otherwise the singular
/// value is used. `null` leaves the field unset, while `false`, `0` and `""`
/// set it to an explicitly empty container. Keys that are not aliases are
/// copied unchanged.
#[must_use]
pub fn canonicalize(raw: &RawOptions) -> RawOptions {
    let mut out = raw.clone();

    for &(singular, plural, shape) in OPTION_ALIASES {
        let plural_value = out.remove(plural);
        let singular_value = out.remove(singular);

        let value = match (plural_value, singular_value) {
            (Some(p), _) if is_truthy(&p) => p,
            (_, Some(s)) => s,
            (Some(p), None) => p,
            (None, None) => continue,
        };

        let value = match (shape, value) {
            (_, Value::Null) => continue,
            (AliasShape::Sequence, falsy) if !is_truthy(&falsy) => Value::Array(Vec::new()),
            (AliasShape::Mapping, falsy) if !is_truthy(&falsy) => Value::Object(Map::new()),
            (AliasShape::Sequence, Value::Array(items)) => Value::Array(items),
            (AliasShape::Sequence, scalar) => Value::Array(vec![scalar]),
            (AliasShape::Mapping, value) => value,
        };

        out.insert(plural.to_string(), value);
    }

    out
}

/// Normalizes a raw options record into canonical typed [`Options`].
///
/// Normalization is idempotent: feeding the result back through
/// [`Options::to_raw`] and `normalize` yields the same options.
///
/// # Errors
///
/// Returns a `ConfigError` when a known field has the wrong shape (for
/// example `envs: [1]`) or an override entry has no `files`.
pub fn normalize(raw: &RawOptions) -> Result<Options> {
    let canonical = canonicalize(raw);
    let options: Options = serde_json::from_value(Value::Object(canonical))?;
    Ok(options)
}
