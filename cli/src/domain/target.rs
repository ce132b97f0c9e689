//! Execution target classification and remote command quoting.
//!
//! Pure functions only: no I/O.

use std::fmt;

/// Where a lifecycle command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The current host.
    Local,
    /// A host reachable over SSH, as `user@host`.
    Remote(String),
}

impl Target {
    /// Classify a target specifier.
    ///
    /// A target is remote iff it contains the `@` user/host separator.
    /// Everything else, including the empty string and bare hostnames,
    /// runs locally.
    #[must_use]
    pub fn parse(spec: Option<&str>) -> Self {
        match spec.map(str::trim) {
            Some(s) if is_remote_target(s) => Self::Remote(s.to_string()),
            _ => Self::Local,
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local host"),
            Self::Remote(spec) => f.write_str(spec),
        }
    }
}

/// Returns `true` when `spec` names an SSH destination.
#[must_use]
pub fn is_remote_target(spec: &str) -> bool {
    spec.contains('@')
}

/// Quote a single argument for a POSIX shell.
///
/// Safe words pass through unchanged; everything else is wrapped in single
/// quotes with embedded quotes escaped as `'\''`.
#[must_use]
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@,+%".contains(c));
    if safe {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Join an argument vector into one shell command line.
#[must_use]
pub fn shell_join(argv: &[&str]) -> String {
    argv.iter()
        .map(|a| shell_quote(a))
        .collect::<Vec<_>>()
        .join(" ")
}
