//! `PrivilegeAdapter` implementation: root runs commands as-is, anyone else
//! goes through `sudo`.

use crate::application::ports::{CommandRunner, PrivilegeAdapter};

/// Elevation policy detected once at startup.
#[derive(Debug, Clone)]
pub struct SudoPrivilege {
    privileged: bool,
    user: Option<String>,
}

impl SudoPrivilege {
    /// Acting as root already.
    #[must_use]
    pub fn root() -> Self {
        Self {
            privileged: true,
            user: Some("root".to_string()),
        }
    }

    /// Unprivileged `user`; commands are prefixed with `sudo`.
    #[must_use]
    pub fn via_sudo(user: Option<String>) -> Self {
        Self {
            privileged: false,
            user,
        }
    }

    /// Detect the effective user of this process.
    ///
    /// Reads the owner of `/proc/self`, falling back to `id -u`. When neither
    /// works the process is assumed unprivileged, which only costs a `sudo`.
    pub async fn detect(runner: &impl CommandRunner) -> Self {
        let uid = match proc_self_uid() {
            Some(uid) => Some(uid),
            None => id_output(runner, "-u")
                .await
                .and_then(|s| s.parse::<u32>().ok()),
        };
        if uid == Some(0) {
            return Self::root();
        }
        let user = match std::env::var("USER") {
            Ok(user) if !user.is_empty() => Some(user),
            _ => id_output(runner, "-un").await,
        };
        tracing::debug!(?uid, ?user, "running unprivileged; commands will use sudo");
        Self::via_sudo(user)
    }
}

#[cfg(unix)]
fn proc_self_uid() -> Option<u32> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata("/proc/self").ok().map(|m| m.uid())
}

#[cfg(not(unix))]
fn proc_self_uid() -> Option<u32> {
    None
}

async fn id_output(runner: &impl CommandRunner, flag: &str) -> Option<String> {
    let out = runner.run("id", &[flag]).await.ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

impl PrivilegeAdapter for SudoPrivilege {
    fn is_privileged(&self) -> bool {
        self.privileged
    }

    fn wrap<'a>(&self, argv: &[&'a str]) -> Vec<&'a str> {
        if self.privileged {
            return argv.to_vec();
        }
        std::iter::once("sudo").chain(argv.iter().copied()).collect()
    }

    fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}
