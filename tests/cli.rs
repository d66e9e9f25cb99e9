//! Integration tests for the fhirconnect-nav CLI

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const BINARY: &str = env!("CARGO_BIN_EXE_fhirconnect-nav");

fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("a.yaml"),
        "metadata:\n  name: \"Patient\"\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("b.yaml"),
        "mappings:\n  - name: subject\n    slotArchetype: \"Patient\"\n",
    )
    .unwrap();
    temp
}

fn run(args: &[&str]) -> Output {
    Command::new(BINARY)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run command")
}

fn path(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_goto_from_declaration() {
    let temp = workspace();
    let a = temp.path().join("a.yaml");

    let output = run(&["goto", path(&a), "--line", "2", "--column", "4"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("b.yaml:3:21 - Patient"), "{}", stdout);
}

#[test]
fn test_goto_json_uses_zero_based_positions() {
    let temp = workspace();
    let b = temp.path().join("b.yaml");

    let output = run(&[
        "goto",
        path(&b),
        "--line",
        "3",
        "--column",
        "22",
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["outcome"], "opened");
    assert_eq!(json["anchor"]["position"]["line"], 1);
    assert_eq!(json["anchor"]["position"]["character"], 9);
    assert!(json["anchor"]["path"].as_str().unwrap().ends_with("a.yaml"));
}

#[test]
fn test_goto_with_pick() {
    let temp = workspace();
    fs::write(temp.path().join("c.yaml"), "slotArchetype: Patient\n").unwrap();
    let a = temp.path().join("a.yaml");

    let output = run(&["goto", path(&a), "--line", "2", "--column", "3", "--pick", "2"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("c.yaml:1:16"), "{}", stdout);
}

#[test]
fn test_goto_not_navigable() {
    let temp = workspace();
    let b = temp.path().join("b.yaml");

    let output = run(&["goto", path(&b), "--line", "2", "--column", "7"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nothing to navigate"));
}

#[test]
fn test_candidates_json() {
    let temp = workspace();
    let a = temp.path().join("a.yaml");

    let output = run(&[
        "candidates",
        "--root",
        path(temp.path()),
        "--file",
        path(&a),
        "--symbol",
        "Patient",
        "--category",
        "metadata.name",
        "--format",
        "json",
    ]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["category"], "slotArchetype");
    assert_eq!(list[0]["kind"], "mapping");
}

#[test]
fn test_locate() {
    let temp = workspace();
    let b = temp.path().join("b.yaml");

    let output = run(&[
        "locate",
        path(&b),
        "--symbol",
        "patient",
        "--category",
        "slotArchetype",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("b.yaml:3:21"), "{}", stdout);
}

#[test]
fn test_click() {
    let temp = workspace();
    let a = temp.path().join("a.yaml");

    let output = run(&["click", path(&a), "--line", "2", "--column", "3"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("metadata.name"));
    assert!(stdout.contains("metadataName"));
    assert!(stdout.contains("symbol: Patient"));
}

#[test]
fn test_scan_skips_build_dirs() {
    let temp = workspace();
    fs::create_dir_all(temp.path().join("build")).unwrap();
    fs::write(temp.path().join("build/gen.yaml"), "x: 1\n").unwrap();

    let output = run(&["scan", path(temp.path()), "--format", "json"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[test]
fn test_position_outside_file() {
    let temp = workspace();
    let a = temp.path().join("a.yaml");

    let output = run(&["goto", path(&a), "--line", "40", "--column", "1"]);

    assert!(!output.status.success());
}

#[test]
fn test_config_override() {
    let temp = workspace();
    fs::write(
        temp.path().join(".fhirconnect-nav.yaml"),
        "scan:\n  extensions: [yml]\n",
    )
    .unwrap();

    let output = run(&["scan", path(temp.path())]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 file(s) found"));
}
