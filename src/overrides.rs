//! Path-scoped override rules.
//!
//! An override pairs one or more glob patterns with partial options. For a
//! given file, the set of overrides whose patterns match is summarised as a
//! bitmask: the first declared rule is the most significant bit and the last
//! declared rule is bit 0. Two files with the same mask under the same base
//! options always resolve to the same effective options, which is what lets
//! [`crate::grouping`] cluster files without merging per file.
//!
//! Glob semantics are path-aware and case-sensitive: `*` stays within a path
//! segment and `**` crosses segments.

use crate::error::{Result, XoError};
use crate::options::{normalize, Options, RawOptions};
use globset::{Candidate, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::path::Path;

/// Maximum number of override rules, bounded by the width of the hash.
pub const MAX_OVERRIDES: usize = u64::BITS as usize;

/// A glob-scoped partial configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawOptions")]
pub struct OverrideRule {
    /// Patterns selecting the files this rule applies to.
    pub files: Vec<String>,
    /// Normalized partial options applied to matching files.
    pub options: Options,
}

impl OverrideRule {
    /// Creates a rule from patterns and already-normalized options.
    pub fn new<I, S>(files: I, options: Options) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
            options,
        }
    }
}

impl TryFrom<RawOptions> for OverrideRule {
    type Error = XoError;

    fn try_from(mut raw: RawOptions) -> Result<Self> {
        let files = match raw.remove("files") {
            Some(Value::String(pattern)) => vec![pattern],
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(pattern) => Ok(pattern),
                    other => Err(XoError::config_error(format!(
                        "override `files` entries must be strings, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(XoError::config_error(format!(
                    "override `files` must be a pattern or a list of patterns, got {other}"
                )));
            }
            None => {
                return Err(XoError::config_error(
                    "override entry is missing its required `files` pattern",
                ));
            }
        };

        if files.is_empty() {
            return Err(XoError::config_error(
                "override entry has an empty `files` list",
            ));
        }

        Ok(Self {
            files,
            options: normalize(&raw)?,
        })
    }
}

#[derive(Serialize)]
struct OverrideRepr<'a> {
    files: &'a [String],
    #[serde(flatten)]
    options: &'a Options,
}

impl Serialize for OverrideRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        OverrideRepr {
            files: &self.files,
            options: &self.options,
        }
        .serialize(serializer)
    }
}

/// The overrides that apply to one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicableOverrides<'a> {
    /// Bitmask identity of the matching rules.
    pub hash: u64,
    /// Matching rules, in declaration order.
    pub applicable: Vec<&'a OverrideRule>,
}

/// An ordered list of override rules with their patterns compiled once.
#[derive(Debug, Clone)]
pub struct OverrideSet<'a> {
    rules: &'a [OverrideRule],
    globs: GlobSet,
    /// Index of the owning rule for every compiled pattern.
    owners: Vec<usize>,
}

impl<'a> OverrideSet<'a> {
    /// Compiles the patterns of every rule.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a pattern is invalid, a rule has no
    /// patterns, or there are more than [`MAX_OVERRIDES`] rules.
    pub fn new(rules: &'a [OverrideRule]) -> Result<Self> {
        if rules.len() > MAX_OVERRIDES {
            return Err(XoError::config_error(format!(
                "at most {MAX_OVERRIDES} override rules are supported, got {}",
                rules.len()
            )));
        }

        let mut builder = GlobSetBuilder::new();
        let mut owners = Vec::new();
        for (index, rule) in rules.iter().enumerate() {
            if rule.files.is_empty() {
                return Err(XoError::config_error(format!(
                    "override #{} is missing its required `files` pattern",
                    index + 1
                )));
            }
            for pattern in &rule.files {
                builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
                owners.push(index);
            }
        }

        Ok(Self {
            rules,
            globs: builder.build()?,
            owners,
        })
    }

    /// Number of rules in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn bit(&self, index: usize) -> u64 {
        1u64 << (self.rules.len() - 1 - index)
    }

    /// Computes the override hash for `path`.
    #[must_use]
    pub fn hash_for(&self, path: &Path) -> u64 {
        let candidate = Candidate::new(path);
        self.globs
            .matches_candidate(&candidate)
            .into_iter()
            .fold(0, |hash, pattern| hash | self.bit(self.owners[pattern]))
    }

    /// Rules selected by `hash`, in declaration order.
    pub fn rules_for_hash(&self, hash: u64) -> impl Iterator<Item = &'a OverrideRule> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(index, _)| hash & self.bit(*index) != 0)
            .map(|(_, rule)| rule)
    }

    /// Finds the rules that apply to `path`.
    #[must_use]
    pub fn find_applicable(&self, path: &Path) -> ApplicableOverrides<'a> {
        let hash = self.hash_for(path);
        let applicable: Vec<_> = self.rules_for_hash(hash).collect();
        tracing::trace!(
            path = %path.display(),
            hash,
            matched = applicable.len(),
            "Resolved applicable overrides"
        );
        ApplicableOverrides { hash, applicable }
    }
}

/// Finds the overrides that apply to `path`.
///
/// Convenience wrapper that compiles `overrides` for a single lookup; use
/// [`OverrideSet`] when checking many paths.
///
/// # Errors
///
/// Returns a `ConfigError` if any pattern is invalid.
pub fn find_applicable_overrides<'a>(
    path: &Path,
    overrides: &'a [OverrideRule],
) -> Result<ApplicableOverrides<'a>> {
    Ok(OverrideSet::new(overrides)?.find_applicable(path))
}
