//! End-to-end CLI tests for the registry-sync binary.

#![allow(deprecated)]

mod support;
use support::registry::{mount_component, registry_base, start_registry};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

const TOKEN_ENV: &str = "SHADCNBLOCKS_API_KEY";

/// Command isolated from the user's config and environment.
fn isolated_command(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("registry-sync").unwrap();
    cmd.current_dir(workdir.path())
        .env("XDG_CONFIG_HOME", workdir.path().join("xdg-config"))
        .env_remove(TOKEN_ENV)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("registry-sync").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mirror component definitions"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("registry-sync").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("registry-sync"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("registry-sync").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_credential_fails_before_any_io() {
    let workdir = TempDir::new().unwrap();
    let output_dir = workdir.path().join("out");

    let assert = isolated_command(&workdir)
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--names")
        .arg(workdir.path().join("does-not-exist.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("SHADCNBLOCKS_API_KEY not set"));
    assert_eq!(assert.get_output().status.code(), Some(1));
    assert!(!output_dir.exists(), "output dir must not be created");
}

#[test]
fn test_blank_credential_is_rejected() {
    let workdir = TempDir::new().unwrap();
    isolated_command(&workdir)
        .env(TOKEN_ENV, "   ")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("SHADCNBLOCKS_API_KEY not set"));
}

#[test]
fn test_custom_token_env_is_consulted() {
    let workdir = TempDir::new().unwrap();
    isolated_command(&workdir)
        .env(TOKEN_ENV, "ignored")
        .arg("--token-env")
        .arg("MIRROR_TOKEN_FOR_TEST")
        .env_remove("MIRROR_TOKEN_FOR_TEST")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("MIRROR_TOKEN_FOR_TEST not set"));
}

#[test]
fn test_missing_names_file_reports_path() {
    let workdir = TempDir::new().unwrap();
    isolated_command(&workdir)
        .env(TOKEN_ENV, "token")
        .arg("--names")
        .arg("missing-list.txt")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing-list.txt"));
}

#[test]
fn test_all_present_run_prints_summary_without_network() {
    let workdir = TempDir::new().unwrap();
    let output_dir = workdir.path().join("r");
    std::fs::create_dir_all(&output_dir).unwrap();
    std::fs::write(output_dir.join("hero1.json"), "{}").unwrap();
    std::fs::write(workdir.path().join("components.txt"), "hero1\n\nhero1\n").unwrap();

    isolated_command(&workdir)
        .env(TOKEN_ENV, "token")
        // Closed port: any request would be reported as a failure.
        .arg("--base-url")
        .arg("http://127.0.0.1:9/r")
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Total: 2 | Already downloaded: 2 | Remaining: 0",
        ))
        .stdout(predicate::str::contains("Done. 0 downloaded, 2 skipped, 0 errors."));
}

#[tokio::test]
async fn test_mixed_run_is_permissive_by_default_and_strict_on_request() {
    let Some(mock_server) = start_registry().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path("/r/hero1"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"name\":\"hero1\"}"))
        .mount(&mock_server)
        .await;
    mount_component(&mock_server, "missing1", 404, "").await;

    let workdir = TempDir::new().unwrap();
    let output_dir = workdir.path().join("public").join("r");
    std::fs::write(workdir.path().join("components.txt"), "hero1\nmissing1\n").unwrap();

    isolated_command(&workdir)
        .env(TOKEN_ENV, "sk-test")
        .arg("--base-url")
        .arg(registry_base(&mock_server))
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--request-delay-ms")
        .arg("0")
        .assert()
        .success()
        .stdout(predicate::str::contains("SKIP [missing1]: error:404"))
        .stdout(predicate::str::contains("2/2 - ok:1 skipped:0 errors:1"))
        .stdout(predicate::str::contains("Done. 1 downloaded, 0 skipped, 1 errors."))
        // Per-name failures are reported on stdout only.
        .stderr(predicate::str::is_empty());

    assert_eq!(
        std::fs::read_to_string(output_dir.join("hero1.json")).unwrap(),
        "{\"name\":\"hero1\"}"
    );

    // hero1 is now on disk; missing1 still fails, so --strict reports a partial run.
    isolated_command(&workdir)
        .env(TOKEN_ENV, "sk-test")
        .arg("--base-url")
        .arg(registry_base(&mock_server))
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--strict")
        .arg("-q")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Done. 0 downloaded, 1 skipped, 1 errors."));
}

#[test]
fn test_config_file_supplies_defaults() {
    let workdir = TempDir::new().unwrap();
    let config_dir = workdir.path().join("xdg-config").join("registry-sync");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "names_file = \"list.txt\"\noutput_dir = \"mirror\"\n",
    )
    .unwrap();
    std::fs::create_dir_all(workdir.path().join("mirror")).unwrap();
    std::fs::write(workdir.path().join("mirror").join("a.json"), "{}").unwrap();
    std::fs::write(workdir.path().join("list.txt"), "a\n").unwrap();

    isolated_command(&workdir)
        .env(TOKEN_ENV, "token")
        .arg("--base-url")
        .arg("http://127.0.0.1:9/r")
        .assert()
        .success()
        .stdout(predicate::str::contains("Done. 0 downloaded, 1 skipped, 0 errors."));
}

#[test]
fn test_invalid_config_file_is_setup_error() {
    let workdir = TempDir::new().unwrap();
    let config_path = workdir.path().join("bad.toml");
    std::fs::write(&config_path, "max_attempts = 0\n").unwrap();

    isolated_command(&workdir)
        .env(TOKEN_ENV, "token")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("max_attempts"));
}
