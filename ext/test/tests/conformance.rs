//! Conformance tests that run YAML fixtures against s3rules
//!
//! Run with: cargo test -p s3rules-test --test conformance

#![cfg(feature = "fixtures")]

use s3rules_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Load and run every fixture in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} has no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_virtual_hosted() {
    run_fixture_file("virtual_hosted.yaml");
}

#[test]
fn test_path_style() {
    run_fixture_file("path_style.yaml");
}

#[test]
fn test_access_points() {
    run_fixture_file("access_points.yaml");
}

#[test]
fn test_outposts() {
    run_fixture_file("outposts.yaml");
}

#[test]
fn test_express() {
    run_fixture_file("express.yaml");
}

#[test]
fn test_service() {
    run_fixture_file("service.yaml");
}

#[test]
fn test_errors() {
    run_fixture_file("errors.yaml");
}

#[test]
fn test_custom_rule_sets() {
    run_fixture_file("custom_rule_set.yaml");
}

#[test]
fn test_every_fixture_file_is_listed() {
    let listed = [
        "access_points.yaml",
        "custom_rule_set.yaml",
        "errors.yaml",
        "express.yaml",
        "outposts.yaml",
        "path_style.yaml",
        "service.yaml",
        "virtual_hosted.yaml",
    ];
    let mut found: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".yaml"))
        .collect();
    found.sort();
    assert_eq!(found, listed);
}
