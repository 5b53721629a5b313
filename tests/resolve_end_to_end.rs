//! End-to-end tests from a project tree on disk to resolved configurations.
//!
//! Each test lays out a small project (manifest, installed shareable configs,
//! source files), then runs the same pipeline the `resolve` command runs:
//! stored options, target collection, grouping and building.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use xoopt_core::builder::{ConfigBuilder, ResolvedGroup, RuleMergeStrategy, CACHE_DIR};
use xoopt_core::cli::OutputFormat;
use xoopt_core::file_utils::collect_lint_targets;
use xoopt_core::grouping::group_by_options;
use xoopt_core::module_resolver::NodeModulesResolver;
use xoopt_core::options::Options;
use xoopt_core::pkg_conf::{merge_with_pkg_conf, PackageJsonLoader};
use xoopt_core::report::render_groups;

/// Helper to create a file and its parent directories.
fn create_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("file has parent")).expect("Failed to create dir");
    fs::write(path, content).expect("Failed to write file");
}

/// Helper to lay out a project with a stored config, one installed shareable
/// config and sources under `src/` and `test/`.
fn project(stored: Value) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path();
    create_file(
        root,
        "package.json",
        &json!({ "name": "fixture", "xo": stored, "engines": { "node": ">=6" } }).to_string(),
    );
    create_file(root, "node_modules/eslint-config-foo/index.js", "module.exports = {};");
    create_file(root, "src/index.js", "");
    create_file(root, "src/util.js", "");
    create_file(root, "src/readme.md", "");
    create_file(root, "test/index.js", "");
    temp
}

/// Runs stored options, collection, grouping and building for `cwd`.
fn resolve(cwd: &Path, strategy: RuleMergeStrategy) -> Vec<ResolvedGroup> {
    let opts = merge_with_pkg_conf(cwd, &Options::default(), &PackageJsonLoader::default())
        .expect("stored options should load");

    let files: Vec<PathBuf> = collect_lint_targets(&[], cwd, &[])
        .expect("targets should be collected")
        .into_iter()
        .map(|path| path.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or(path))
        .collect();

    let groups = group_by_options(&files, &opts).expect("grouping should succeed");

    let resolver = NodeModulesResolver;
    ConfigBuilder::new(cwd, &resolver)
        .rules_strategy(strategy)
        .build_groups(&groups)
        .expect("configs should build")
}

fn stored_options() -> Value {
    json!({
        "space": true,
        "semicolon": false,
        "extends": "foo",
        "overrides": [{ "files": "test/**", "env": "mocha" }],
    })
}

#[test]
fn test_groups_follow_overrides() {
    let temp = project(stored_options());

    let resolved = resolve(temp.path(), RuleMergeStrategy::Merge);

    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].hash, 0);
    assert_eq!(
        resolved[0].paths,
        vec![PathBuf::from("src/index.js"), PathBuf::from("src/util.js")]
    );
    assert_eq!(resolved[1].hash, 0b1);
    assert_eq!(resolved[1].paths, vec![PathBuf::from("test/index.js")]);

    assert!(resolved[0].config.envs.is_empty());
    assert_eq!(resolved[1].config.envs, vec!["mocha".to_string()]);
}

#[test]
fn test_resolved_config_carries_style_engine_and_extends() {
    let temp = project(stored_options());

    let resolved = resolve(temp.path(), RuleMergeStrategy::Merge);
    let config = &resolved[0].config;

    assert_eq!(config.rules["indent"], json!(["error", 2, { "SwitchCase": 1 }]));
    assert_eq!(config.rules["semi"], json!(["error", "never"]));
    assert_eq!(config.rules["prefer-rest-params"], json!("error"));
    assert!(!config.plugins.iter().any(|plugin| plugin == "react"));

    let installed = temp.path().join("node_modules/eslint-config-foo/index.js");
    assert_eq!(
        config.base_config.extends,
        vec!["xo/esnext".to_string(), installed.to_string_lossy().into_owned()]
    );
    assert_eq!(config.cache_location, temp.path().join(CACHE_DIR));
}

#[test]
fn test_replace_strategy_keeps_only_explicit_rules() {
    let mut stored = stored_options();
    stored["rules"] = json!({ "no-console": "off" });
    let temp = project(stored);

    let resolved = resolve(temp.path(), RuleMergeStrategy::Replace);

    for group in &resolved {
        assert_eq!(Value::Object(group.config.rules.clone()), json!({ "no-console": "off" }));
    }
}

#[test]
fn test_merge_strategy_lets_explicit_rules_win() {
    let mut stored = stored_options();
    stored["rules"] = json!({ "semi": "off" });
    let temp = project(stored);

    let resolved = resolve(temp.path(), RuleMergeStrategy::Merge);

    assert_eq!(resolved[0].config.rules["semi"], json!("off"));
    assert!(resolved[0].config.rules.contains_key("indent"));
}

#[test]
fn test_missing_shareable_config_fails() {
    let mut stored = stored_options();
    stored["extends"] = json!("not-installed");
    let temp = project(stored);

    let opts = merge_with_pkg_conf(temp.path(), &Options::default(), &PackageJsonLoader::default())
        .unwrap();
    let resolver = NodeModulesResolver;
    let err = ConfigBuilder::new(temp.path(), &resolver)
        .build(&opts)
        .unwrap_err();

    assert_eq!(err.name(), "ModuleNotFound");
}

#[test]
fn test_grouping_renders_as_text() {
    let temp = project(stored_options());
    let opts = merge_with_pkg_conf(temp.path(), &Options::default(), &PackageJsonLoader::default())
        .unwrap();
    let files = vec![PathBuf::from("test/a.js"), PathBuf::from("src/b.js")];

    let mut groups = group_by_options(&files, &opts).unwrap();
    for group in &mut groups {
        group.opts.cwd = None;
    }

    let output = render_groups(&groups, OutputFormat::Text).unwrap();

    insta::assert_snapshot!(output, @r#"
    Group 1  hash=0b1  files=1
      options: {"engines":{"node":">=6"},"envs":["mocha"],"extends":["foo"],"semicolon":false,"space":true}
      - test/a.js

    Group 2  hash=0b0  files=1
      options: {"engines":{"node":">=6"},"extends":["foo"],"semicolon":false,"space":true}
      - src/b.js
    "#);
}
