//! Integration tests for `siteio agent config`.
//!
//! Every test points `--data-dir` at a temp directory so nothing under
//! `/var/lib/siteio` is read or written.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn config(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("siteio"));
    cmd.env_remove("SITEIO_DATA_DIR")
        .env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(dir.path())
        .args(["agent", "config"]);
    cmd
}

#[test]
fn test_config_help_shows_subcommands() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("unset"));
}

#[test]
fn test_config_list_on_empty_dir_shows_unset_keys() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("apiKey"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_config_set_then_get_roundtrips_domain() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .args(["set", "domain", "demo.siteio.me"])
        .assert()
        .success();
    config(&dir)
        .args(["get", "domain"])
        .assert()
        .success()
        .stdout("demo.siteio.me\n");
}

#[test]
fn test_config_get_masks_secrets_unless_raw() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .args(["set", "cloudflareToken", "cf-secret-token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cf-secret-token").not());
    config(&dir)
        .args(["get", "cloudflareToken"])
        .assert()
        .success()
        .stdout("****oken\n");
    config(&dir)
        .args(["get", "cloudflareToken", "--raw"])
        .assert()
        .success()
        .stdout("cf-secret-token\n");
}

#[test]
fn test_config_unset_api_key_is_refused() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .args(["set", "apiKey", "k3y-k3y-k3y-k3y"])
        .assert()
        .success();
    config(&dir)
        .args(["unset", "apiKey"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
    config(&dir)
        .args(["get", "apiKey", "--raw"])
        .assert()
        .success()
        .stdout("k3y-k3y-k3y-k3y\n");
}

#[test]
fn test_config_unset_optional_key() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .args(["set", "domain", "demo.siteio.me"])
        .assert()
        .success();
    config(&dir).args(["unset", "domain"]).assert().success();
    config(&dir).args(["get", "domain"]).assert().failure();
}

#[test]
fn test_config_unknown_key_lists_valid_keys() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .args(["set", "api_key", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"))
        .stderr(predicate::str::contains("cloudflareToken"));
}

#[test]
fn test_config_rejects_invalid_domain() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .args(["set", "domain", "Not_A_Domain"])
        .assert()
        .failure();
}

#[test]
fn test_config_list_json_masks_secrets() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .args(["set", "apiKey", "0123456789abcdef"])
        .assert()
        .success();
    let out = Command::new(assert_cmd::cargo::cargo_bin!("siteio"))
        .env_remove("SITEIO_DATA_DIR")
        .arg("--data-dir")
        .arg(dir.path())
        .args(["--json", "agent", "config", "list"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["apiKey"], "****cdef");
    assert!(v["domain"].is_null());
}

#[test]
fn test_config_unset_json_error_code() {
    let dir = TempDir::new().unwrap();
    config(&dir)
        .args(["--json", "unset", "apiKey"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("state_conflict"));
}
