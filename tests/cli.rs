//! Binary smoke tests for the docent-rs CLI.
//!
//! Network-free commands only: help output, the tool catalog listing,
//! prompt scaffolding, and index status reporting.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn docent() -> Command {
    Command::cargo_bin("docent-rs").expect("binary builds")
}

#[test]
fn help_lists_commands() {
    docent()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("index"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("tools"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn tools_lists_default_catalog() {
    docent()
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_datetime"))
        .stdout(predicate::str::contains("get_weather"))
        .stdout(predicate::str::contains("get_calc"))
        .stdout(predicate::str::contains("document_qa"));
}

#[test]
fn tools_json_output_is_valid() {
    let output = docent()
        .args(["--format", "json", "tools"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value =
        serde_json::from_slice(&output).expect("tools --format json emits valid JSON");
    assert_eq!(parsed["tools"].as_array().map(Vec::len), Some(4));
}

#[test]
fn status_reports_missing_index() {
    let tmp = tempfile::tempdir().expect("tempdir");
    docent()
        .args(["status", "--index-dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No index found"));
}

#[test]
fn init_prompts_writes_templates() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = tmp.path().join("prompts");

    docent()
        .args(["init-prompts", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2"));

    assert!(dir.join("router.md").exists());
    assert!(dir.join("grounding.md").exists());
}

#[test]
fn index_rejects_missing_source() {
    let tmp = tempfile::tempdir().expect("tempdir");
    docent()
        .args(["index", "/definitely/not/a/file.txt", "--index-dir"])
        .arg(tmp.path().join("idx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn unknown_subcommand_fails() {
    docent().arg("frobnicate").assert().failure();
}
