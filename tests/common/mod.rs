//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get an institrack command with a clean environment
pub fn institrack() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("institrack"));
    cmd.env_remove("INSTITRACK_DATA_DIR")
        .env_remove("INSTITRACK_ROLE")
        .env_remove("INSTITRACK_STORE_FORMAT")
        .env_remove("INSTITRACK_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    institrack()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success();
    tmp
}

/// Helper to create a test submission, returning its full key
pub fn create_test_submission(tmp: &TempDir, name: &str) -> String {
    let output = institrack()
        .current_dir(tmp.path())
        .args(["sub", "new", "--name", name, "--format", "id"])
        .output()
        .unwrap();
    assert!(output.status.success(), "sub new failed: {:?}", output);

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .find(|l| l.starts_with("SUB-"))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Keys in one collection, in stored order
pub fn list_keys(tmp: &TempDir, collection: &str) -> Vec<String> {
    let output = institrack()
        .current_dir(tmp.path())
        .args(["sub", "list", collection, "--format", "id"])
        .output()
        .unwrap();
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
