//! Unit tests for delegating install/uninstall to a remote host.

#![allow(clippy::unwrap_used)]

use siteio_cli::application::services::remote::{self, RemoteInstallArgs, RemoteUninstallArgs};
use siteio_cli::domain::error::LifecycleError;

use crate::helpers::{ScriptedHost, err_output};

fn install_args() -> RemoteInstallArgs {
    RemoteInstallArgs {
        domain: "demo.siteio.me".into(),
        email: None,
        cloudflare_token: Some("cf-token".into()),
        data_dir: None,
        yes: true,
    }
}

#[tokio::test]
async fn unreachable_host_is_a_connectivity_error() {
    let exec = ScriptedHost::remote().on(
        "true",
        err_output(255, b"ssh: connect to host example.net port 22: Connection refused"),
    );

    let err = remote::install(&exec, &install_args()).await.unwrap_err();

    match err.downcast_ref::<LifecycleError>() {
        Some(LifecycleError::Connectivity { target, detail }) => {
            assert_eq!(target, "deploy@example.net");
            assert!(detail.contains("Connection refused"), "got: {detail}");
        }
        other => panic!("expected connectivity error, got {other:?}"),
    }
    assert_eq!(exec.calls(), ["true"]);
}

#[tokio::test]
async fn ssh_spawn_failure_is_a_connectivity_error() {
    let exec = ScriptedHost::remote().fail_spawn("true", "No such file or directory");

    let err = remote::uninstall(
        &exec,
        RemoteUninstallArgs {
            remove_data: false,
            remove_containers: false,
            data_dir: None,
            yes: false,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LifecycleError>(),
        Some(LifecycleError::Connectivity { .. })
    ));
}

#[tokio::test]
async fn missing_remote_binary_is_reported_before_streaming() {
    let exec = ScriptedHost::remote().on("command -v siteio", err_output(1, b""));

    let err = remote::install(&exec, &install_args()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LifecycleError>(),
        Some(LifecycleError::NotFound(_))
    ));
    assert!(err.to_string().contains("deploy@example.net"));
    assert!(!exec.ran("siteio agent install"));
}

#[tokio::test]
async fn install_streams_the_delegated_command() {
    let exec = ScriptedHost::remote();

    let status = remote::install(&exec, &install_args()).await.unwrap();

    assert!(status.success());
    assert_eq!(
        exec.calls(),
        [
            "true",
            "command -v siteio",
            "siteio agent install --domain demo.siteio.me --cloudflare-token cf-token --yes",
        ]
    );
}

#[tokio::test]
async fn remote_exit_code_is_passed_back() {
    let exec = ScriptedHost::remote().streamed_exit(1);

    let status = remote::uninstall(
        &exec,
        RemoteUninstallArgs {
            remove_data: true,
            remove_containers: true,
            data_dir: Some("/srv/site io".into()),
            yes: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!exec.ran("command -v"), "uninstall does not require the binary check");
    assert!(exec.ran(
        "siteio --data-dir /srv/site io agent uninstall --remove-data --remove-containers --yes"
    ));
}
