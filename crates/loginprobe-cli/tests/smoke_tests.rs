//! Smoke tests for the loginprobe CLI

#![allow(deprecated)] // Command::cargo_bin until assert_cmd settles the replacement
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the loginprobe binary, isolated in `dir`
fn loginprobe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("loginprobe").expect("loginprobe binary should exist");
    cmd.current_dir(dir.path())
        .env_remove("LOGINPROBE_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_no_args_fails() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir).assert().failure();
}

// ============================================================================
// Subcommands
// ============================================================================

#[test]
fn test_list_shows_scenarios() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("login/positive/valid-credentials"))
        .stdout(predicate::str::contains("login/errors/slow-network"));
}

#[test]
fn test_list_bad_grep_fails() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .args(["list", "--grep", "("])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--grep"));
}

#[test]
fn test_config_json() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .args(["config", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"base_url\""))
        .stdout(predicate::str::contains("orangehrmlive"));
}

#[test]
fn test_init_then_refuse() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .args(["init", "--dir", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loginprobe.yaml"));

    assert!(dir.path().join("project/loginprobe.yaml").is_file());
    assert!(dir.path().join("project/fixtures/credentials.json").is_file());

    loginprobe(&dir)
        .args(["init", "--dir", "project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    loginprobe(&dir)
        .args(["init", "--dir", "project", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_reads_local_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("loginprobe.yaml"),
        "base_url: http://hr.internal/\n",
    )
    .unwrap();
    loginprobe(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://hr.internal/"));
}

#[test]
fn test_run_simulated_suite() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .args(["-q", "--color", "never", "run", "--simulate"])
        .assert()
        .success();

    let reports: Vec<_> = fs::read_dir(dir.path().join("loginprobe/reports"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);
    let json = fs::read_to_string(&reports[0]).unwrap();
    assert!(json.contains("\"failures\": 0"));
}

#[test]
fn test_run_simulated_subset() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .args(["--color", "never", "run", "--simulate", "--grep", "^login/empty/"])
        .assert()
        .success()
        .stderr(predicate::str::contains("3 tests"));
}

#[test]
fn test_run_rejects_bad_base_url() {
    let dir = TempDir::new().unwrap();
    loginprobe(&dir)
        .args(["run", "--simulate", "--base-url", "ftp://nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}
