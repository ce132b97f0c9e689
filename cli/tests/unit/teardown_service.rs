//! Unit tests for the local uninstall sequence.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use siteio_cli::application::ports::ConfigStore;
use siteio_cli::application::services::host::Host;
use siteio_cli::application::services::containers::ContainerInfo;
use siteio_cli::application::services::teardown::{
    self, DnsCleanup, TeardownFlags, TeardownIntent, TeardownPlan,
};
use siteio_cli::domain::error::LifecycleError;
use siteio_cli::domain::step::StepStatus;
use siteio_cli::domain::unit::UNIT_PATH;
use siteio_cli::infra::config::JsonConfigStore;
use siteio_cli::infra::privilege::SudoPrivilege;
use siteio_common::AgentConfig;
use tempfile::TempDir;

use crate::helpers::{FakeDns, RecordingReporter, ScriptedHost, err_output, ok_output};

const CONTAINERS: &[u8] = b"siteio-blog\tUp 2 hours\nsiteio-docs\tExited (0) 3 days ago\n";

fn seed(dir: &Path, domain: Option<&str>, token: Option<&str>) {
    JsonConfigStore
        .save(
            dir,
            &AgentConfig {
                api_key: Some("a".repeat(64)),
                domain: domain.map(str::to_string),
                cloudflare_token: token.map(str::to_string),
            },
        )
        .expect("seed config");
}

fn dns_with_wildcard() -> FakeDns {
    FakeDns::with_zones(&["siteio.me"]).with_record("siteio.me", "*.demo.siteio.me", "203.0.113.7")
}

#[tokio::test]
async fn inspect_without_unit_runs_only_the_existence_check() {
    let dir = TempDir::new().unwrap();
    let exec = ScriptedHost::not_installed();
    let privilege = SudoPrivilege::root();

    let plan = teardown::inspect(Host::new(&exec, &privilege), &JsonConfigStore, dir.path())
        .await
        .unwrap();

    assert!(plan.is_none());
    assert_eq!(exec.calls(), vec![format!("test -f {UNIT_PATH}")]);
}

#[tokio::test]
async fn inspect_collects_containers_and_dns_state() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), Some("demo.siteio.me"), Some("cf-token"));
    let exec = ScriptedHost::installed().on("docker ps", ok_output(CONTAINERS));
    let privilege = SudoPrivilege::root();

    let plan = teardown::inspect(Host::new(&exec, &privilege), &JsonConfigStore, dir.path())
        .await
        .unwrap()
        .expect("agent is installed");

    let names: Vec<_> = plan.containers.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["siteio-blog", "siteio-docs"]);
    assert_eq!(plan.container_error, None);
    assert_eq!(
        plan.dns,
        DnsCleanup::Configured {
            domain: "demo.siteio.me".into(),
            token: "cf-token".into()
        }
    );
}

#[tokio::test]
async fn inspect_records_container_listing_failure() {
    let dir = TempDir::new().unwrap();
    let exec = ScriptedHost::installed().on(
        "docker ps",
        err_output(1, b"Cannot connect to the Docker daemon"),
    );
    let privilege = SudoPrivilege::root();

    let plan = teardown::inspect(Host::new(&exec, &privilege), &JsonConfigStore, dir.path())
        .await
        .unwrap()
        .unwrap();

    assert!(plan.containers.is_empty());
    assert!(plan.container_error.is_some());
    assert_eq!(plan.dns, DnsCleanup::NotConfigured);
}

#[tokio::test]
async fn uninstall_with_yes_removes_everything_but_the_data_dir() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), Some("demo.siteio.me"), Some("cf-token"));
    let exec = ScriptedHost::installed().on("docker ps", ok_output(CONTAINERS));
    let privilege = SudoPrivilege::root();
    let dns = dns_with_wildcard();
    let reporter = RecordingReporter::default();
    let host = Host::new(&exec, &privilege);

    let plan = teardown::inspect(host, &JsonConfigStore, dir.path())
        .await
        .unwrap()
        .unwrap();
    let flags = TeardownFlags {
        yes: true,
        ..TeardownFlags::default()
    };
    let intent = teardown::resolve_intent(flags, &plan, |prompt, _| {
        panic!("--yes must not prompt: {prompt}")
    })
    .unwrap();
    let report = teardown::execute(host, &dns, &reporter, &plan, intent)
        .await
        .unwrap();

    for name in ["siteio-blog", "siteio-docs"] {
        let stop = exec.position(&format!("docker stop {name}")).unwrap();
        let rm = exec.position(&format!("docker rm -f {name}")).unwrap();
        assert!(stop < rm, "{name} must be stopped before removal");
    }
    let stop = exec.position("systemctl stop siteio-agent").unwrap();
    let disable = exec.position("systemctl disable siteio-agent").unwrap();
    let unit = exec.position(&format!("rm -f {UNIT_PATH}")).unwrap();
    let reload = exec.position("systemctl daemon-reload").unwrap();
    assert!(stop < disable && disable < unit && unit < reload);
    assert!(!exec.ran("rm -rf"), "data dir must be kept");
    assert!(dir.path().exists());

    assert_eq!(dns.record_count(), 0);
    assert_eq!(dns.state.borrow().tokens, ["cf-token"]);
    assert_eq!(report.status_of("dns cleanup"), Some(StepStatus::Succeeded));
    assert_eq!(
        report.status_of("remove data directory"),
        Some(StepStatus::Skipped)
    );
    assert_eq!(report.warnings().count(), 0);
}

#[tokio::test]
async fn kept_containers_are_not_touched() {
    let dir = TempDir::new().unwrap();
    let exec = ScriptedHost::installed().on("docker ps", ok_output(CONTAINERS));
    let privilege = SudoPrivilege::root();
    let host = Host::new(&exec, &privilege);
    let reporter = RecordingReporter::default();

    let plan = teardown::inspect(host, &JsonConfigStore, dir.path())
        .await
        .unwrap()
        .unwrap();
    let report = teardown::execute(
        host,
        &FakeDns::default(),
        &reporter,
        &plan,
        TeardownIntent::default(),
    )
    .await
    .unwrap();

    assert!(!exec.ran("docker stop"));
    assert!(!exec.ran("docker rm"));
    assert_eq!(
        report.status_of("container cleanup"),
        Some(StepStatus::Skipped)
    );
    assert!(exec.ran(&format!("rm -f {UNIT_PATH}")));
}

#[tokio::test]
async fn domain_without_token_warns_about_manual_dns_cleanup() {
    let dir = TempDir::new().unwrap();
    seed(dir.path(), Some("demo.siteio.me"), None);
    let exec = ScriptedHost::installed();
    let privilege = SudoPrivilege::root();
    let host = Host::new(&exec, &privilege);
    let reporter = RecordingReporter::default();

    let plan = teardown::inspect(host, &JsonConfigStore, dir.path())
        .await
        .unwrap()
        .unwrap();
    let report = teardown::execute(
        host,
        &FakeDns::default(),
        &reporter,
        &plan,
        TeardownIntent::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.status_of("dns cleanup"), Some(StepStatus::Warned));
    let warnings = reporter.warnings();
    assert!(
        warnings.iter().any(|w| w.contains("*.demo.siteio.me")),
        "got: {warnings:?}"
    );
}

#[tokio::test]
async fn failing_service_stop_is_only_a_warning() {
    let dir = TempDir::new().unwrap();
    let exec = ScriptedHost::installed().on(
        "systemctl stop",
        err_output(5, b"Failed to stop siteio-agent.service: Unit not loaded."),
    );
    let privilege = SudoPrivilege::root();
    let host = Host::new(&exec, &privilege);
    let reporter = RecordingReporter::default();

    let plan = teardown::inspect(host, &JsonConfigStore, dir.path())
        .await
        .unwrap()
        .unwrap();
    let report = teardown::execute(
        host,
        &FakeDns::default(),
        &reporter,
        &plan,
        TeardownIntent::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.status_of("stop service"), Some(StepStatus::Warned));
    assert!(exec.ran("systemctl daemon-reload"));
    assert!(reporter.warnings().iter().any(|w| w.starts_with("stop service:")));
}

#[tokio::test]
async fn unit_file_removal_failure_aborts_the_sequence() {
    let dir = TempDir::new().unwrap();
    let exec = ScriptedHost::installed().on(
        "rm -f /etc/systemd",
        err_output(1, b"rm: cannot remove: Read-only file system"),
    );
    let privilege = SudoPrivilege::root();
    let host = Host::new(&exec, &privilege);
    let reporter = RecordingReporter::default();

    let plan = teardown::inspect(host, &JsonConfigStore, dir.path())
        .await
        .unwrap()
        .unwrap();
    let err = teardown::execute(
        host,
        &FakeDns::default(),
        &reporter,
        &plan,
        TeardownIntent::default(),
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("remove unit file failed"), "got: {err:#}");
    assert!(!exec.ran("systemctl daemon-reload"));
}

#[tokio::test]
async fn sudo_refusal_surfaces_as_privilege_error() {
    let dir = TempDir::new().unwrap();
    let exec = ScriptedHost::installed().on(
        "sudo rm -f",
        err_output(1, b"sudo: a password is required"),
    );
    let privilege = SudoPrivilege::via_sudo(Some("deploy".into()));
    let host = Host::new(&exec, &privilege);
    let reporter = RecordingReporter::default();

    let plan = teardown::inspect(host, &JsonConfigStore, dir.path())
        .await
        .unwrap()
        .unwrap();
    let err = teardown::execute(
        host,
        &FakeDns::default(),
        &reporter,
        &plan,
        TeardownIntent::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LifecycleError>(),
        Some(LifecycleError::Privilege(_))
    ));
    assert!(exec.ran("sudo systemctl stop siteio-agent"));
}

#[tokio::test]
async fn remove_data_deletes_the_data_directory() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("siteio");
    seed(&data, None, None);
    let exec = ScriptedHost::installed();
    let privilege = SudoPrivilege::root();
    let host = Host::new(&exec, &privilege);
    let reporter = RecordingReporter::default();

    let plan = teardown::inspect(host, &JsonConfigStore, &data)
        .await
        .unwrap()
        .unwrap();
    let report = teardown::execute(
        host,
        &FakeDns::default(),
        &reporter,
        &plan,
        TeardownIntent {
            remove_containers: false,
            remove_data: true,
        },
    )
    .await
    .unwrap();

    assert!(exec.ran(&format!("rm -rf {}", data.display())));
    assert_eq!(
        report.status_of("remove data directory"),
        Some(StepStatus::Succeeded)
    );
    assert_eq!(report.status_of("dns cleanup"), Some(StepStatus::Skipped));
}

// ── Intent resolution ────────────────────────────────────────────────────────

fn plan_with_containers(names: &[&str]) -> TeardownPlan {
    TeardownPlan {
        data_dir: PathBuf::from("/var/lib/siteio"),
        containers: names
            .iter()
            .map(|name| ContainerInfo {
                name: (*name).to_string(),
                status: "Up 2 hours".to_string(),
            })
            .collect(),
        container_error: None,
        dns: DnsCleanup::NotConfigured,
    }
}

/// Answers prompts from a queue and remembers each prompt with its default.
fn scripted_answers(
    answers: &[bool],
    asked: &RefCell<Vec<(String, bool)>>,
) -> impl FnMut(&str, bool) -> anyhow::Result<bool> {
    let mut answers = answers.to_vec().into_iter();
    move |prompt, default| {
        asked.borrow_mut().push((prompt.to_string(), default));
        Ok(answers.next().expect("unexpected prompt"))
    }
}

#[test]
fn yes_removes_containers_and_keeps_data_without_asking() {
    let asked = RefCell::new(Vec::new());
    let flags = TeardownFlags {
        yes: true,
        ..TeardownFlags::default()
    };

    let intent = teardown::resolve_intent(
        flags,
        &plan_with_containers(&["siteio-blog", "siteio-docs"]),
        scripted_answers(&[], &asked),
    )
    .unwrap();

    assert_eq!(
        intent,
        TeardownIntent {
            remove_containers: true,
            remove_data: false,
        }
    );
    assert!(asked.borrow().is_empty());
}

#[test]
fn remove_data_flag_skips_the_data_prompt() {
    let asked = RefCell::new(Vec::new());
    let flags = TeardownFlags {
        remove_data: true,
        ..TeardownFlags::default()
    };

    let intent = teardown::resolve_intent(
        flags,
        &plan_with_containers(&["siteio-blog"]),
        scripted_answers(&[true], &asked),
    )
    .unwrap();

    assert!(intent.remove_data);
    assert!(intent.remove_containers);
    let asked = asked.borrow();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].0.contains("1 siteio container"));
    assert!(asked[0].1, "container prompt defaults to removal");
}

#[test]
fn no_containers_means_only_the_data_question_is_asked() {
    let asked = RefCell::new(Vec::new());

    let intent = teardown::resolve_intent(
        TeardownFlags::default(),
        &plan_with_containers(&[]),
        scripted_answers(&[false], &asked),
    )
    .unwrap();

    assert_eq!(
        intent,
        TeardownIntent {
            remove_containers: true,
            remove_data: false,
        }
    );
    let asked = asked.borrow();
    assert_eq!(asked.len(), 1);
    assert!(asked[0].0.contains("/var/lib/siteio"));
    assert!(!asked[0].1, "data prompt defaults to keeping the directory");
}

#[test]
fn declined_container_prompt_keeps_containers() {
    let asked = RefCell::new(Vec::new());

    let intent = teardown::resolve_intent(
        TeardownFlags::default(),
        &plan_with_containers(&["siteio-blog", "siteio-docs"]),
        scripted_answers(&[false, false], &asked),
    )
    .unwrap();

    assert_eq!(intent, TeardownIntent::default());
    assert_eq!(asked.borrow().len(), 2);
}

#[test]
fn remove_containers_flag_skips_the_container_prompt() {
    let asked = RefCell::new(Vec::new());
    let flags = TeardownFlags {
        remove_containers: true,
        ..TeardownFlags::default()
    };

    let intent = teardown::resolve_intent(
        flags,
        &plan_with_containers(&["siteio-blog"]),
        scripted_answers(&[true], &asked),
    )
    .unwrap();

    assert!(intent.remove_containers);
    assert!(intent.remove_data);
    assert!(asked.borrow()[0].0.contains("data directory"));
}
