//! End-to-end tests for argument parsing and read-only commands.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use siteio_common::ConnectionToken;
use tempfile::TempDir;

fn siteio(data_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("siteio"));
    cmd.env_remove("SITEIO_DATA_DIR")
        .env_remove("CLOUDFLARE_API_TOKEN")
        .env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(data_dir.path());
    cmd
}

#[test]
fn test_help_lists_agent_commands() {
    let dir = TempDir::new().unwrap();
    siteio(&dir)
        .args(["agent", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("oauth"))
        .stdout(predicate::str::contains("token"));
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    siteio(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("siteio"));
}

#[test]
fn test_no_color_env_accepts_any_value() {
    let dir = TempDir::new().unwrap();
    for value in ["1", "yes", ""] {
        siteio(&dir)
            .env("NO_COLOR", value)
            .args(["agent", "config", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\x1b[").not());
    }
}

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    siteio(&dir).args(["agent", "bogus"]).assert().failure();
}

#[test]
fn test_token_without_config_fails_with_hint() {
    let dir = TempDir::new().unwrap();
    siteio(&dir)
        .args(["agent", "token"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("siteio agent install"));
}

#[test]
fn test_token_json_error_has_code() {
    let dir = TempDir::new().unwrap();
    siteio(&dir)
        .args(["--json", "agent", "token"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"code\": \"not_found\""));
}

#[test]
fn test_token_prints_decodable_token() {
    let dir = TempDir::new().unwrap();
    let key = "ab".repeat(32);
    siteio(&dir)
        .args(["agent", "config", "set", "domain", "demo.siteio.me"])
        .assert()
        .success();
    siteio(&dir)
        .args(["agent", "config", "set", "apiKey", &key])
        .assert()
        .success();

    let out = siteio(&dir).args(["agent", "token"]).output().unwrap();
    assert!(out.status.success());
    let token = ConnectionToken::decode(String::from_utf8(out.stdout).unwrap().trim()).unwrap();
    assert_eq!(token.api_url, "https://api.demo.siteio.me");
    assert_eq!(token.api_key, key);
}

#[test]
fn test_install_without_domain_fails_non_interactively() {
    let dir = TempDir::new().unwrap();
    siteio(&dir)
        .args(["agent", "install", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Domain"));
}

#[test]
fn test_install_rejects_malformed_domain() {
    let dir = TempDir::new().unwrap();
    siteio(&dir)
        .args(["-y", "agent", "install", "--domain", "not a domain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for domain"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_status_json_reports_uninstalled_agent() {
    if std::path::Path::new("/etc/systemd/system/siteio-agent.service").exists() {
        return;
    }
    let dir = TempDir::new().unwrap();
    siteio(&dir)
        .args(["--json", "agent", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"installed\": false"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_uninstall_without_agent_is_a_no_op() {
    if std::path::Path::new("/etc/systemd/system/siteio-agent.service").exists() {
        return;
    }
    let dir = TempDir::new().unwrap();
    siteio(&dir)
        .args(["agent", "uninstall", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to uninstall"));
}
