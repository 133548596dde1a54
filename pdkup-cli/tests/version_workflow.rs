//! Integration tests for the version management workflow.
//!
//! These tests drive the built `pdkup` binary against a temporary PDK
//! root, exercising the offline command surface (listing, activation,
//! removal). Commands that need the remote archive service are covered by
//! library tests with mock clients instead.
//!
//! # Running Integration Tests
//!
//! Integration tests are excluded from regular test runs. Use:
//! ```bash
//! cargo test --test '*' -- --ignored --nocapture
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Seed a mock installed version directly in the store layout.
fn install_mock(root: &Path, family: &str, token: &str) {
    let dir = root.join(family).join("versions").join(token);
    fs::create_dir_all(&dir).expect("Failed to create mock version");
    fs::write(dir.join("SOURCES"), format!("open_pdks {}", token))
        .expect("Failed to write mock version");
}

/// Get the path to the pdkup CLI binary.
fn cli_binary() -> PathBuf {
    let debug_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("target/debug/pdkup");

    if debug_path.exists() {
        return debug_path;
    }

    let release_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("target/release/pdkup");

    if release_path.exists() {
        return release_path;
    }

    panic!("CLI binary not found. Run `cargo build` first.");
}

/// Run a CLI command against a given root and capture output.
fn run_cli(root: &Path, args: &[&str]) -> std::process::Output {
    Command::new(cli_binary())
        .args(args)
        .arg("--pdk-root")
        .arg(root)
        .env_remove("PDK_ROOT")
        .env_remove("PDK_FAMILY")
        .output()
        .expect("Failed to execute CLI command")
}

/// Assert a command succeeded.
fn assert_success(output: &std::process::Output, context: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!(
            "{} failed:\nstdout: {}\nstderr: {}",
            context, stdout, stderr
        );
    }
}

#[test]
#[ignore = "integration test - run with 'cargo test -- --ignored'"]
fn test_current_fails_when_nothing_active() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    let output = run_cli(temp.path(), &["current"]);
    assert!(!output.status.success());
    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No version is active"));
}

#[test]
#[ignore = "integration test - run with 'cargo test -- --ignored'"]
fn test_ls_lists_seeded_versions() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    install_mock(temp.path(), "sky130", "aaa111");
    install_mock(temp.path(), "sky130", "bbb222");

    let output = run_cli(temp.path(), &["ls"]);
    assert_success(&output, "ls");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("aaa111"));
    assert!(stdout.contains("bbb222"));
}

#[test]
#[ignore = "integration test - run with 'cargo test -- --ignored'"]
fn test_rm_force_removes_inactive_version() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    install_mock(temp.path(), "sky130", "aaa111");

    let output = run_cli(temp.path(), &["rm", "aaa111", "--force"]);
    assert_success(&output, "rm --force");
    assert!(!temp.path().join("sky130/versions/aaa111").exists());
}

#[test]
#[ignore = "integration test - run with 'cargo test -- --ignored'"]
fn test_unknown_family_is_usage_error() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    let output = run_cli(temp.path(), &["ls", "--pdk", "tsmc65"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown PDK family"));
    assert!(stderr.contains("sky130"), "help should list known families");
}

#[test]
#[ignore = "integration test - run with 'cargo test -- --ignored'"]
fn test_disable_is_idempotent() {
    let temp = TempDir::new().expect("Failed to create temp dir");

    let first = run_cli(temp.path(), &["disable"]);
    assert_success(&first, "disable with nothing active");

    let second = run_cli(temp.path(), &["disable"]);
    assert_success(&second, "second disable");
}
