//! Integration tests for reading stored options from `package.json` files.
//!
//! These tests build small project trees in temporary directories and verify:
//! - The nearest manifest carrying options wins
//! - Manifests with the options key set to `false` are skipped
//! - An empty options object, or a manifest without the key, stops the search
//! - `engines` handling, including explicit overrides and suppression

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use xoopt_core::options::{normalize, Engines, Options, Space};
use xoopt_core::pkg_conf::{merge_with_pkg_conf, ManifestLoader, PackageJsonLoader};
use xoopt_core::XoError;

/// Helper to write a `package.json` with the given content.
fn write_manifest(dir: &Path, content: Value) {
    fs::create_dir_all(dir).expect("Failed to create fixture dir");
    fs::write(dir.join("package.json"), content.to_string()).expect("Failed to write manifest");
}

/// Helper to build the nested fixture tree:
///
/// ```text
/// nested/package.json              { "xo": { "esnext": true } }
/// nested/child/package.json        { "xo": { "space": 2 } }
/// nested/child-ignore/package.json { "xo": false }
/// nested/child-empty/package.json  { "xo": {} }
/// ```
fn nested_fixture() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let root = temp.path().join("nested");
    write_manifest(&root, json!({ "name": "nested", "xo": { "esnext": true } }));
    write_manifest(&root.join("child"), json!({ "name": "child", "xo": { "space": 2 } }));
    write_manifest(&root.join("child-ignore"), json!({ "name": "child-ignore", "xo": false }));
    write_manifest(&root.join("child-empty"), json!({ "name": "child-empty", "xo": {} }));
    temp
}

fn no_engines() -> Option<Engines> {
    Some(Engines::Targets(BTreeMap::new()))
}

fn options(value: Value) -> Options {
    normalize(value.as_object().expect("options fixture is an object")).expect("valid options")
}

#[test]
fn test_nearest_manifest_with_options_wins() {
    let temp = nested_fixture();
    let cwd = temp.path().join("nested/child");

    let result = merge_with_pkg_conf(&cwd, &Options::default(), &PackageJsonLoader::default())
        .expect("merge should succeed");

    assert_eq!(
        result,
        Options {
            cwd: Some(cwd),
            space: Some(Space::Width(2)),
            engines: no_engines(),
            ..Options::default()
        }
    );
}

#[test]
fn test_manifest_with_false_key_is_skipped() {
    let temp = nested_fixture();
    let cwd = temp.path().join("nested/child-ignore");

    let result = merge_with_pkg_conf(&cwd, &Options::default(), &PackageJsonLoader::default())
        .expect("merge should succeed");

    assert_eq!(result.esnext, Some(true));
    assert_eq!(result.space, None);
    assert_eq!(result.cwd.as_deref(), Some(cwd.as_path()));
}

#[test]
fn test_empty_options_object_stops_search() {
    let temp = nested_fixture();
    let cwd = temp.path().join("nested/child-empty");

    let result = merge_with_pkg_conf(&cwd, &Options::default(), &PackageJsonLoader::default())
        .expect("merge should succeed");

    assert_eq!(
        result,
        Options {
            cwd: Some(cwd),
            engines: no_engines(),
            ..Options::default()
        }
    );
}

#[test]
fn test_search_starts_below_any_manifest() {
    let temp = nested_fixture();
    let cwd = temp.path().join("nested/child/src/deep");
    fs::create_dir_all(&cwd).unwrap();

    let result = merge_with_pkg_conf(&cwd, &Options::default(), &PackageJsonLoader::default())
        .unwrap();

    assert_eq!(result.space, Some(Space::Width(2)));
    assert_eq!(result.cwd.as_deref(), Some(cwd.as_path()));
}

#[test]
fn test_explicit_options_win_field_by_field() {
    let temp = nested_fixture();
    let cwd = temp.path().join("nested/child");
    let explicit = options(json!({ "space": 4, "env": "mocha" }));

    let result = merge_with_pkg_conf(&cwd, &explicit, &PackageJsonLoader::default()).unwrap();

    assert_eq!(result.space, Some(Space::Width(4)));
    assert_eq!(result.envs, Some(vec!["mocha".to_string()]));
}

#[test]
fn test_explicit_cwd_is_replaced() {
    let temp = nested_fixture();
    let cwd = temp.path().join("nested/child");
    let explicit = Options {
        cwd: Some("elsewhere".into()),
        ..Options::default()
    };

    let result = merge_with_pkg_conf(&cwd, &explicit, &PackageJsonLoader::default()).unwrap();

    assert_eq!(result.cwd.as_deref(), Some(cwd.as_path()));
}

#[test]
fn test_engines_read_from_manifest() {
    let temp = TempDir::new().unwrap();
    write_manifest(
        temp.path(),
        json!({ "xo": { "semicolon": false }, "engines": { "node": ">=6" } }),
    );

    let result =
        merge_with_pkg_conf(temp.path(), &Options::default(), &PackageJsonLoader::default())
            .unwrap();

    let expected: BTreeMap<String, String> = [("node".to_string(), ">=6".to_string())].into();
    assert_eq!(result.engines, Some(Engines::Targets(expected)));
    assert_eq!(result.semicolon, Some(false));
}

#[test]
fn test_engines_come_from_nearest_manifest_only() {
    let temp = TempDir::new().unwrap();
    write_manifest(temp.path(), json!({ "engines": { "node": ">=8" } }));
    let cwd = temp.path().join("pkg");
    write_manifest(&cwd, json!({ "xo": { "esnext": false } }));

    let manifest = PackageJsonLoader::default()
        .load_nearest_manifest(&cwd)
        .unwrap()
        .expect("manifest should be found");

    assert_eq!(manifest.path, cwd.join("package.json"));
    assert_eq!(manifest.options.get("esnext"), Some(&json!(false)));
    assert_eq!(manifest.engines, None);
}

#[test]
fn test_package_without_options_key_does_not_inherit_from_parent() {
    let temp = TempDir::new().unwrap();
    write_manifest(
        temp.path(),
        json!({ "xo": { "space": 4 }, "engines": { "node": ">=8" } }),
    );
    let cwd = temp.path().join("packages/child");
    write_manifest(&cwd, json!({ "name": "child" }));

    let result = merge_with_pkg_conf(&cwd, &Options::default(), &PackageJsonLoader::default())
        .unwrap();

    assert_eq!(
        result,
        Options {
            cwd: Some(cwd),
            engines: no_engines(),
            ..Options::default()
        }
    );
}

#[test]
fn test_switched_off_manifest_still_supplies_engines() {
    let temp = TempDir::new().unwrap();
    write_manifest(temp.path(), json!({ "xo": { "space": 4 }, "engines": { "node": ">=4" } }));
    let cwd = temp.path().join("child");
    write_manifest(&cwd, json!({ "xo": false, "engines": { "node": ">=10" } }));

    let result = merge_with_pkg_conf(&cwd, &Options::default(), &PackageJsonLoader::default())
        .unwrap();

    assert_eq!(result.space, Some(Space::Width(4)));
    assert_eq!(
        result.engines,
        Some(Engines::Targets([("node".to_string(), ">=10".to_string())].into()))
    );
}

#[test]
fn test_explicit_engines_supersede_manifest() {
    let temp = TempDir::new().unwrap();
    write_manifest(temp.path(), json!({ "engines": { "node": ">=6" } }));
    let explicit = Options {
        engines: Some(Engines::Targets(
            [("node".to_string(), ">=8".to_string())].into(),
        )),
        ..Options::default()
    };

    let result =
        merge_with_pkg_conf(temp.path(), &explicit, &PackageJsonLoader::default()).unwrap();

    assert_eq!(result.engines, explicit.engines);
}

#[test]
fn test_explicit_engines_false_suppresses_manifest() {
    let temp = TempDir::new().unwrap();
    write_manifest(temp.path(), json!({ "engines": { "node": ">=6" } }));
    let explicit = options(json!({ "engines": false }));

    let result =
        merge_with_pkg_conf(temp.path(), &explicit, &PackageJsonLoader::default()).unwrap();

    assert_eq!(
        result,
        Options {
            cwd: Some(temp.path().to_path_buf()),
            engines: Some(Engines::Flag(false)),
            ..Options::default()
        }
    );
}

#[test]
fn test_malformed_stored_options_report_manifest_path() {
    let temp = TempDir::new().unwrap();
    write_manifest(temp.path(), json!({ "xo": { "envs": [1] } }));

    let err = merge_with_pkg_conf(temp.path(), &Options::default(), &PackageJsonLoader::default())
        .unwrap_err();

    match err {
        XoError::ConfigError { path, .. } => {
            assert_eq!(path, Some(temp.path().join("package.json")));
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}
