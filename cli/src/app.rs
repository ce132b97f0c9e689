//! Application context: unified state passed to every command handler.
//!
//! Holds the output context, the resolved data directory, the production
//! adapters shared by all commands, and the prompt helpers. Prompts live here
//! and only here: services receive fully resolved intent.

use std::path::{Path, PathBuf};

use anyhow::Result;
use siteio_common::DEFAULT_DATA_DIR;

use crate::infra::cloudflare::CloudflareConnector;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::JsonConfigStore;
use crate::infra::executor::LocalExecutor;
use crate::infra::fs::LocalFs;
use crate::infra::privilege::SudoPrivilege;
use crate::infra::public_ip::IpifyResolver;
use crate::output::OutputContext;

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CI` / `SITEIO_YES` env vars).
    pub yes: bool,
    /// Agent data directory.
    pub data_dir: PathBuf,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode, JSON mode).
    pub output: OutputContext,
    /// Agent data directory on this host.
    pub data_dir: PathBuf,
    pub config_store: JsonConfigStore,
    pub local_fs: LocalFs,
    pub dns: CloudflareConnector,
    pub public_ip: IpifyResolver,
    /// When `true`, skip interactive prompts and use defaults.
    ///
    /// Set when `--yes` / `-y` is passed, or when the `CI` or `SITEIO_YES`
    /// environment variables are present.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let ci_env = std::env::var("CI").is_ok() || std::env::var("SITEIO_YES").is_ok();
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet)
                .with_json(flags.output.json),
            data_dir: flags.behaviour.data_dir.clone(),
            config_store: JsonConfigStore,
            local_fs: LocalFs,
            dns: CloudflareConnector,
            public_ip: IpifyResolver::default(),
            non_interactive: flags.behaviour.yes || ci_env,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.output.json
    }

    /// Data directory to forward to a remote `siteio`, if not the default.
    ///
    /// The remote side resolves its own default, so only an explicit
    /// override is passed on.
    #[must_use]
    pub fn remote_data_dir(&self) -> Option<PathBuf> {
        (self.data_dir != Path::new(DEFAULT_DATA_DIR)).then(|| self.data_dir.clone())
    }

    /// Executor for lifecycle commands on this host; these run unbounded.
    #[must_use]
    pub fn local_executor(&self) -> LocalExecutor<TokioCommandRunner> {
        LocalExecutor::new(TokioCommandRunner::without_timeout())
    }

    /// Detect whether privileged commands need `sudo`.
    pub async fn privilege(&self) -> SudoPrivilege {
        SudoPrivilege::detect(&TokioCommandRunner::default()).await
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true` (CI, `--yes` flag, or `SITEIO_YES` env),
    /// returns `default` immediately without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }

    /// Ask for a line of text. Empty answers are allowed only when `allow_empty`.
    ///
    /// # Errors
    ///
    /// Returns an error when running non-interactively or the prompt fails.
    pub fn input(&self, prompt: &str, allow_empty: bool) -> Result<String> {
        if self.non_interactive {
            anyhow::bail!("{prompt} is required (cannot prompt in non-interactive mode)");
        }
        let value: String = dialoguer::Input::new()
            .with_prompt(prompt)
            .allow_empty(allow_empty)
            .interact_text()?;
        Ok(value.trim().to_string())
    }

    /// Ask for a secret without echoing it.
    ///
    /// # Errors
    ///
    /// Returns an error when running non-interactively or the prompt fails.
    pub fn password(&self, prompt: &str, allow_empty: bool) -> Result<String> {
        if self.non_interactive {
            anyhow::bail!("{prompt} is required (cannot prompt in non-interactive mode)");
        }
        let value = dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(allow_empty)
            .interact()?;
        Ok(value.trim().to_string())
    }
}
