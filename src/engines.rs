//! Runtime-gated rule selection.
//!
//! Some rules only make sense once the target runtime supports the syntax or
//! API they recommend. A project declares its runtime through `engines`
//! (`{"node": ">=6"}`); the lowest version admitted by that range decides
//! which tiers of the table below are switched on. Gating is additive: it
//! only ever adds rules.

use crate::error::{Result, XoError};
use crate::options::Engines;
use semver::{Comparator, Op, Version, VersionReq};
use serde_json::{json, Map, Value};

/// Runtime whose version gates the optional rules.
pub const NODE_RUNTIME: &str = "node";

/// Rule name to severity or `[severity, ...options]`.
pub type RuleSet = Map<String, Value>;

/// A minimum-version requirement for one runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConstraint {
    /// Runtime name, e.g. `node`.
    pub runtime: String,
    /// Version range as written, e.g. `>=6`.
    pub range: String,
}

impl EngineConstraint {
    /// Creates a constraint for `runtime`.
    pub fn new(runtime: impl Into<String>, range: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            range: range.into(),
        }
    }

    /// Extracts the node constraint from an `engines` value, if declared.
    #[must_use]
    pub fn from_engines(engines: &Engines) -> Option<Self> {
        engines
            .range_for(NODE_RUNTIME)
            .map(|range| Self::new(NODE_RUNTIME, range))
    }

    /// Lowest version admitted by the range.
    ///
    /// The range uses npm syntax: whitespace-separated comparators
    /// (`>=6 <10`), hyphen ranges (`6 - 10`) and `||` alternatives
    /// (`^8 || ^10`). The result is the smallest minimum across the
    /// satisfiable alternatives.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the range if it cannot be parsed or if
    /// no version satisfies it.
    pub fn min_version(&self) -> Result<Version> {
        let mut min: Option<Version> = None;

        for alternative in self.range.split("||") {
            let req = VersionReq::parse(&comparator_set(alternative)).map_err(|err| {
                XoError::ConfigError {
                    message: format!(
                        "invalid `engines.{}` range `{}`: {}",
                        self.runtime, self.range, err
                    ),
                    path: None,
                    source: Some(Box::new(err)),
                }
            })?;

            let lowest = req
                .comparators
                .iter()
                .filter_map(lower_bound)
                .max()
                .unwrap_or_else(|| Version::new(0, 0, 0));

            if req.matches(&lowest) && min.as_ref().is_none_or(|min| lowest < *min) {
                min = Some(lowest);
            }
        }

        min.ok_or_else(|| {
            XoError::config_error(format!(
                "`engines.{}` range `{}` cannot be satisfied by any version",
                self.runtime, self.range
            ))
        })
    }
}

/// Rewrites one npm comparator set (no `||`) as a comma-separated requirement.
fn comparator_set(alternative: &str) -> String {
    let tokens: Vec<&str> = alternative
        .split_whitespace()
        .map(|token| token.trim_end_matches(','))
        .filter(|token| !token.is_empty())
        .collect();

    if let [from, "-", to] = tokens.as_slice() {
        return format!(">={}, <={}", bare_version(from), bare_version(to));
    }

    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in tokens {
        let split = token
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '^' | '~'))
            .unwrap_or(token.len());
        let (op, version) = token.split_at(split);
        let op = pending_op.take().unwrap_or("").to_string() + op;

        if version.is_empty() {
            pending_op = Some(token);
            continue;
        }
        comparators.push(format!("{op}{}", bare_version(version)));
    }
    if let Some(op) = pending_op {
        comparators.push(op.to_string());
    }

    if comparators.is_empty() {
        "*".to_string()
    } else {
        comparators.join(", ")
    }
}

/// Strips the `v` prefix npm tolerates and spells wildcards the way `semver`
/// expects.
fn bare_version(version: &str) -> &str {
    let version = version.strip_prefix(['v', 'V']).unwrap_or(version);
    match version {
        "x" | "X" | "" => "*",
        other => other,
    }
}

/// Smallest version a single comparator admits, or `None` for upper bounds.
fn lower_bound(comparator: &Comparator) -> Option<Version> {
    let major = comparator.major;
    let minor = comparator.minor.unwrap_or(0);
    let patch = comparator.patch.unwrap_or(0);

    match comparator.op {
        Op::Exact | Op::GreaterEq | Op::Tilde | Op::Caret | Op::Wildcard => {
            Some(Version::new(major, minor, patch))
        }
        Op::Greater => Some(match (comparator.minor, comparator.patch) {
            (Some(minor), Some(patch)) => Version::new(major, minor, patch + 1),
            (Some(minor), None) => Version::new(major, minor + 1, 0),
            _ => Version::new(major + 1, 0, 0),
        }),
        _ => None,
    }
}

/// Version thresholds and the rules each one introduces, ascending.
fn engine_tiers() -> Vec<(Version, RuleSet)> {
    let tier = |entries: Vec<(&str, Value)>| -> RuleSet {
        entries
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    };

    vec![
        (
            Version::new(5, 0, 0),
            tier(vec![("unicorn/prefer-spread", json!("error"))]),
        ),
        (
            Version::new(6, 0, 0),
            tier(vec![
                ("prefer-rest-params", json!("error")),
                (
                    "prefer-destructuring",
                    json!(["error", { "array": true, "object": true }]),
                ),
            ]),
        ),
        (
            Version::new(8, 0, 0),
            tier(vec![("promise/prefer-await-to-then", json!("error"))]),
        ),
    ]
}

/// Selects the optional rules the target runtime is new enough for.
///
/// No constraint, or a constraint for another runtime, selects nothing.
///
/// # Errors
///
/// Returns a `ConfigError` if the constraint's range is malformed or
/// unsatisfiable. The caller decides whether that is fatal.
pub fn select_engine_rules(constraint: Option<&EngineConstraint>) -> Result<RuleSet> {
    let mut rules = RuleSet::new();

    let Some(constraint) = constraint else {
        return Ok(rules);
    };
    if constraint.runtime != NODE_RUNTIME {
        return Ok(rules);
    }

    let min = constraint.min_version()?;
    for (threshold, tier_rules) in engine_tiers() {
        if min >= threshold {
            tracing::debug!(%min, %threshold, "Enabling engine-gated rules");
            rules.extend(tier_rules);
        }
    }

    Ok(rules)
}
