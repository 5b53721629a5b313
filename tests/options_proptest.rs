//! Property-based tests for option normalization, merging and grouping.
//!
//! This module uses proptest to verify that normalization is idempotent and
//! alias-insensitive, that merging is idempotent, associative and has a
//! neutral element, and that grouping partitions its input.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use xoopt_core::grouping::group_configs;
use xoopt_core::options::{
    normalize, AliasShape, Engines, Mergeable, Options, RawOptions, Space, OPTION_ALIASES,
};
use xoopt_core::overrides::{OverrideRule, OverrideSet};

proptest::proptest! {
    /// Property: Normalization idempotence.
    ///
    /// `normalize(normalize(x)) == normalize(x)`
    #[test]
    fn prop_normalize_is_idempotent(raw in any_raw_options()) {
        let once = normalize(&raw).unwrap();
        let twice = normalize(&once.to_raw().unwrap()).unwrap();
        prop_assert_eq!(twice, once);
    }

    /// Property: Alias equivalence.
    ///
    /// `normalize({singular: v}) == normalize({plural: [v]})` for sequence
    /// aliases, and `normalize({singular: m}) == normalize({plural: m})` for
    /// mapping aliases.
    #[test]
    fn prop_alias_spellings_are_equivalent(
        alias in 0..OPTION_ALIASES.len(),
        value in "[a-z][a-z0-9-]{0,8}",
    ) {
        let (singular, plural, shape) = OPTION_ALIASES[alias];
        let (single, canonical) = match shape {
            AliasShape::Sequence => (json!(value.clone()), json!([value])),
            AliasShape::Mapping => (json!({ value.clone(): "error" }), json!({ value: "error" })),
        };

        let from_singular = normalize(&record(singular, single)).unwrap();
        let from_plural = normalize(&record(plural, canonical)).unwrap();
        prop_assert_eq!(from_singular, from_plural);
    }

    /// Property: Merge idempotence.
    ///
    /// `a.merge(a) == a`
    #[test]
    fn prop_merge_idempotence(opts in any_options()) {
        prop_assert_eq!(opts.merge(&opts), opts);
    }

    /// Property: Merge associativity.
    ///
    /// `(a.merge(b)).merge(c) == a.merge(b.merge(c))`
    #[test]
    fn prop_merge_associativity(a in any_options(), b in any_options(), c in any_options()) {
        let left = a.merge(&b).merge(&c);
        let right = a.merge(&b.merge(&c));
        prop_assert_eq!(left, right);
    }

    /// Property: Unset options are a neutral element on either side.
    #[test]
    fn prop_merge_default_is_neutral(opts in any_options()) {
        prop_assert_eq!(Options::default().merge(&opts), opts.clone());
        prop_assert_eq!(opts.merge(&Options::default()), opts);
    }

    /// Property: Merging over the empty shape keeps every set value and fills
    /// every category.
    #[test]
    fn prop_merge_over_empty_fills_categories(opts in any_options()) {
        let filled = Options::empty().merge(&opts);
        prop_assert!(filled.envs.is_some());
        prop_assert!(filled.rules.is_some());
        prop_assert_eq!(filled.esnext, opts.esnext);
        prop_assert_eq!(filled.envs.unwrap_or_default(), opts.envs.unwrap_or_default());
    }

    /// Property: Grouping partitions the input.
    ///
    /// Every path lands in exactly one group, all members of a group share its
    /// hash, hashes are distinct across groups, and groups appear in order of
    /// first occurrence.
    #[test]
    fn prop_grouping_partitions_paths(
        paths in prop::collection::vec(any_path(), 0..24),
        patterns in prop::collection::vec(any_pattern(), 0..6),
    ) {
        let overrides: Vec<OverrideRule> = patterns
            .iter()
            .map(|pattern| OverrideRule::new([pattern.as_str()], Options::default()))
            .collect();
        let inputs: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();

        let groups = group_configs(&inputs, &Options::default(), &overrides).unwrap();
        let set = OverrideSet::new(&overrides).unwrap();

        let member_count: usize = groups.iter().map(|g| g.paths.len()).sum();
        prop_assert_eq!(member_count, inputs.len());

        let mut seen_hashes = HashSet::new();
        for group in &groups {
            prop_assert!(seen_hashes.insert(group.hash));
            for path in &group.paths {
                prop_assert_eq!(set.hash_for(path), group.hash);
            }
        }

        let mut first_seen = Vec::new();
        for path in &inputs {
            let hash = set.hash_for(path);
            if !first_seen.contains(&hash) {
                first_seen.push(hash);
            }
        }
        let group_order: Vec<u64> = groups.iter().map(|g| g.hash).collect();
        prop_assert_eq!(group_order, first_seen);
    }
}

// ============================================================================
// Strategies for proptest
// ============================================================================

fn record(key: &str, value: Value) -> RawOptions {
    let mut raw = Map::new();
    raw.insert(key.to_string(), value);
    raw
}

fn name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,6}").unwrap()
}

/// Distinct names, in a stable order.
fn unique_names() -> BoxedStrategy<Vec<String>> {
    prop::collection::btree_set(name(), 0..4)
        .prop_map(|names| names.into_iter().collect())
        .boxed()
}

fn any_rules() -> BoxedStrategy<Map<String, Value>> {
    prop::collection::btree_map(name(), prop_oneof![Just("error"), Just("warn"), Just("off")], 0..4)
        .prop_map(|rules| {
            rules
                .into_iter()
                .map(|(rule, level)| (rule, json!(level)))
                .collect()
        })
        .boxed()
}

fn any_space() -> BoxedStrategy<Space> {
    prop_oneof![any::<bool>().prop_map(Space::Enabled), (0u32..9).prop_map(Space::Width)].boxed()
}

fn any_engines() -> BoxedStrategy<Engines> {
    prop::collection::btree_map(
        prop_oneof![Just("node".to_string()), Just("npm".to_string())],
        (4u32..12).prop_map(|major| format!(">={major}")),
        0..2,
    )
    .prop_map(Engines::Targets)
    .boxed()
}

/// Strategy for generating arbitrary normalized options.
fn any_options() -> BoxedStrategy<Options> {
    (
        prop::option::of(unique_names()),
        prop::option::of(unique_names()),
        prop::option::of(unique_names()),
        prop::option::of(any_rules()),
        prop::option::of(any::<bool>()),
        prop::option::of(any_space()),
        prop::option::of(any::<bool>()),
        prop::option::of(any_engines()),
    )
        .prop_map(
            |(envs, globals, plugins, rules, esnext, space, semicolon, engines)| Options {
                envs,
                globals,
                plugins,
                rules,
                esnext,
                space,
                semicolon,
                engines,
                ..Options::default()
            },
        )
        .boxed()
}

/// A sequence alias written singular, plural or not at all.
fn any_sequence_spelling(singular: &'static str, plural: &'static str) -> BoxedStrategy<Option<(String, Value)>> {
    prop_oneof![
        Just(None),
        name().prop_map(move |v| Some((singular.to_string(), json!(v)))),
        prop::collection::vec(name(), 0..3).prop_map(move |v| Some((plural.to_string(), json!(v)))),
    ]
    .boxed()
}

/// Strategy for generating loosely written raw options.
fn any_raw_options() -> BoxedStrategy<RawOptions> {
    (
        any_sequence_spelling("env", "envs"),
        any_sequence_spelling("global", "globals"),
        any_sequence_spelling("extend", "extends"),
        prop::option::of(any_rules().prop_map(Value::Object)),
        any::<bool>(),
        prop::option::of(prop_oneof![any::<bool>().prop_map(Value::from), (0u32..9).prop_map(Value::from)]),
        prop::option::of(any::<bool>()),
    )
        .prop_map(|(env, global, extend, rule, rule_singular, space, esnext)| {
            let mut raw = Map::new();
            for (key, value) in [env, global, extend].into_iter().flatten() {
                raw.insert(key, value);
            }
            if let Some(rules) = rule {
                let key = if rule_singular { "rule" } else { "rules" };
                raw.insert(key.to_string(), rules);
            }
            if let Some(space) = space {
                raw.insert("space".to_string(), space);
            }
            if let Some(esnext) = esnext {
                raw.insert("esnext".to_string(), Value::Bool(esnext));
            }
            raw
        })
        .boxed()
}

fn any_path() -> impl Strategy<Value = String> {
    prop::string::string_regex("(src|test|lib)(/deep)?/[a-c]{1,3}\\.(js|ts)").unwrap()
}

fn any_pattern() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("**/*.js".to_string()),
        Just("test/**".to_string()),
        Just("src/*.ts".to_string()),
        Just("**/a*.js".to_string()),
        Just("lib/**/*.ts".to_string()),
        Just("*.js".to_string()),
    ]
}
