//! Partitioning files by effective configuration.
//!
//! Files whose paths select the same override rules share one effective
//! option set, so options are merged once per group rather than once per
//! file. Override hashes are computed in parallel; groups are then assigned
//! in a second, sequential pass so the output order only depends on the input
//! order.

use crate::error::Result;
use crate::options::{Mergeable, Options};
use crate::overrides::{OverrideRule, OverrideSet};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;

/// Files sharing one effective configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigGroup {
    /// Override hash shared by every member.
    pub hash: u64,
    /// Effective options, with every known category present.
    pub opts: Options,
    /// Member paths, in input order.
    pub paths: Vec<PathBuf>,
}

/// Folds the overrides selected by `hash` into `base`, in declaration order.
///
/// The result is laid over [`Options::empty`] and carries no `overrides` of
/// its own, since they have been applied.
#[must_use]
pub fn effective_options(base: &Options, set: &OverrideSet<'_>, hash: u64) -> Options {
    let merged = set
        .rules_for_hash(hash)
        .fold(base.clone(), |acc, rule| acc.merge(&rule.options));

    let mut opts = Options::empty().merge(&merged);
    opts.overrides = None;
    opts
}

/// Groups `paths` by the overrides that apply to them.
///
/// Every path lands in exactly one group. Groups appear in the order their
/// hash is first seen.
///
/// # Errors
///
/// Returns a `ConfigError` if an override pattern is invalid or there are too
/// many overrides.
#[tracing::instrument(level = "debug", skip_all, fields(paths = paths.len(), overrides = overrides.len()), err)]
pub fn group_configs(
    paths: &[PathBuf],
    base: &Options,
    overrides: &[OverrideRule],
) -> Result<Vec<ConfigGroup>> {
    let set = OverrideSet::new(overrides)?;

    let hashes: Vec<u64> = paths.par_iter().map(|path| set.hash_for(path)).collect();

    let mut groups: Vec<ConfigGroup> = Vec::new();
    let mut slots: HashMap<u64, usize> = HashMap::new();

    for (path, hash) in paths.iter().zip(hashes) {
        let slot = match slots.entry(hash) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                tracing::debug!(hash, "New configuration group");
                groups.push(ConfigGroup {
                    hash,
                    opts: effective_options(base, &set, hash),
                    paths: Vec::new(),
                });
                *entry.insert(groups.len() - 1)
            }
        };
        groups[slot].paths.push(path.clone());
    }

    Ok(groups)
}

/// Groups `paths` using the overrides declared on `opts` itself.
///
/// # Errors
///
/// See [`group_configs`].
pub fn group_by_options(paths: &[PathBuf], opts: &Options) -> Result<Vec<ConfigGroup>> {
    let overrides = opts.overrides.clone().unwrap_or_default();
    let mut base = opts.clone();
    base.overrides = None;
    group_configs(paths, &base, &overrides)
}
