//! End-to-end tests for the mdfex binary.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_process_missing_input_fails() {
    Command::cargo_bin("mdfex")
        .unwrap()
        .args(["process", "definitely-missing.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_rejects_non_pdf_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");
    std::fs::write(&path, "not a report").unwrap();

    Command::cargo_bin("mdfex")
        .unwrap()
        .args(["process", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn test_batch_without_matches_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = dir.path().join("*.pdf");

    Command::cargo_bin("mdfex")
        .unwrap()
        .args(["batch", pattern.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn test_config_path_reports_location() {
    Command::cargo_bin("mdfex")
        .unwrap()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"));
}
