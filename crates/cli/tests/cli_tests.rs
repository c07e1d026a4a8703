//! End-to-end tests for the forgeci binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn forgeci() -> Command {
    Command::cargo_bin("forgeci").unwrap()
}

fn write_config(dir: &Path, contents: &str) {
    fs::write(dir.join("forgeci.toml"), contents).unwrap();
}

const BASIC_CONFIG: &str = r#"
name = "CI"
branches = ["main"]
scalas = ["2.13.14", "3.3.3"]
"#;

#[test]
fn generate_writes_workflow_files() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), BASIC_CONFIG);

    forgeci()
        .args(["generate", "--path"])
        .arg(dir.path())
        .assert()
        .success();

    let ci = fs::read_to_string(dir.path().join(".github/workflows/ci.yml")).unwrap();
    assert!(ci.starts_with("# This file was automatically generated by forgeci."));
    assert!(ci.contains("name: CI"));
    assert!(ci.contains("scala: [2.13.14, 3.3.3]"));
    assert!(dir.path().join(".github/workflows/clean.yml").is_file());
}

#[test]
fn check_succeeds_after_generate() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), BASIC_CONFIG);

    forgeci()
        .args(["generate", "--path"])
        .arg(dir.path())
        .assert()
        .success();
    forgeci()
        .args(["check", "--path"])
        .arg(dir.path())
        .assert()
        .success();
}

#[test]
fn check_fails_when_config_changes() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), BASIC_CONFIG);

    forgeci()
        .args(["generate", "--path"])
        .arg(dir.path())
        .assert()
        .success();

    write_config(dir.path(), "name = \"Renamed CI\"\n");
    forgeci()
        .args(["check", "--path"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of date"));
}

#[test]
fn check_fails_without_generated_files() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), BASIC_CONFIG);

    forgeci()
        .args(["check", "--path"])
        .arg(dir.path())
        .assert()
        .failure();
}

#[test]
fn dry_run_prints_without_writing() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), BASIC_CONFIG);

    forgeci()
        .args(["generate", "--dry-run", "--path"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("runs-on: ${{ matrix.os }}"));

    assert!(!dir.path().join(".github").exists());
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "scalas = []\n");

    forgeci()
        .args(["generate", "--path"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("scalas"));
}
