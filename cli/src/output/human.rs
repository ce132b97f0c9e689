//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::application::services::provisioner::InstallResult;
use crate::application::services::status::AgentStatus;
use crate::application::services::teardown::{DnsCleanup, TeardownPlan};
use crate::domain::dns::wildcard_name;
use crate::domain::step::{SequenceReport, StepStatus};
use crate::output::OutputContext;

/// Renders service results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the agent status block.
    pub fn render_status(&self, status: &AgentStatus) {
        let state = match (&status.state, status.installed) {
            (Some(state), _) => state.clone(),
            (None, false) => "not installed".to_string(),
            (None, true) => "unknown".to_string(),
        };
        self.ctx.header("siteio agent");
        self.ctx.kv("Service:   ", &state);
        self.ctx.kv("Data dir:  ", &status.data_dir);
        self.ctx
            .kv("Domain:    ", status.domain.as_deref().unwrap_or("-"));
        self.ctx
            .kv("API URL:   ", status.api_url.as_deref().unwrap_or("-"));
        self.ctx
            .kv("API key:   ", status.api_key.as_deref().unwrap_or("-"));
        self.ctx.kv(
            "Cloudflare:",
            status.cloudflare_token.as_deref().unwrap_or("not configured"),
        );
        self.ctx.kv(
            "OAuth:     ",
            if status.oauth_configured {
                "configured"
            } else {
                "not configured"
            },
        );
    }

    /// Render the closing block of a successful install.
    pub fn render_install_result(&self, result: &InstallResult) {
        if self.ctx.quiet {
            // The token is the one thing scripts need.
            println!("{}", result.token);
            return;
        }
        self.ctx.blank();
        self.ctx.success("siteio agent installed");
        self.ctx.kv("API URL:", &result.api_url);
        self.render_warnings(&result.report);
        self.ctx.blank();
        self.ctx
            .info("Connect a client with this token (keep it secret):");
        println!("    {}", result.token.style(self.ctx.styles.token));
        self.ctx.blank();
    }

    /// Describe what an uninstall is about to do.
    pub fn render_teardown_plan(&self, plan: &TeardownPlan) {
        self.ctx.header("This will uninstall the siteio agent:");
        self.ctx.kv("  -", "stop and disable siteio-agent");
        self.ctx.kv("  -", "remove the systemd unit file");
        match &plan.dns {
            DnsCleanup::Configured { domain, .. } => {
                self.ctx
                    .kv("  -", &format!("remove DNS record {}", wildcard_name(domain)));
            }
            DnsCleanup::TokenMissing { domain } => {
                self.ctx.kv(
                    "  -",
                    &format!("leave {} in DNS (no Cloudflare token)", wildcard_name(domain)),
                );
            }
            DnsCleanup::NotConfigured => {}
        }
        if !plan.containers.is_empty() {
            self.ctx.kv(
                "  -",
                &format!("{} siteio container(s) found:", plan.containers.len()),
            );
            for c in &plan.containers {
                self.ctx.kv("      ", &format!("{} ({})", c.name, c.status));
            }
        }
        self.ctx.blank();
    }

    /// Summarise a finished teardown.
    pub fn render_teardown_result(&self, report: &SequenceReport) {
        self.ctx.blank();
        self.render_steps(report);
        self.ctx.blank();
        if report.warnings().next().is_none() {
            self.ctx.success("siteio agent uninstalled");
        } else {
            self.ctx.success("siteio agent uninstalled with warnings:");
            self.render_warnings(report);
        }
    }

    /// One line per step: name, then its status label.
    pub fn render_steps(&self, report: &SequenceReport) {
        if !self.ctx.human() {
            return;
        }
        for record in &report.steps {
            let label = status_label(record.status);
            println!(
                "  {:<24} {}",
                record.step,
                label.style(self.ctx.styles.for_status(record.status))
            );
        }
    }

    fn render_warnings(&self, report: &SequenceReport) {
        for w in report.warnings() {
            self.ctx.warn(&format!("{}: {}", w.step, w.message));
        }
    }

    /// Render `key = value` lines.
    pub fn render_config(&self, entries: &[(&str, Option<String>)]) {
        for (key, value) in entries {
            let value = value.as_deref().unwrap_or("(not set)");
            println!("{:<16} {value}", key.style(self.ctx.styles.bold));
        }
    }
}

fn status_label(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Succeeded => "done",
        StepStatus::Skipped => "skipped",
        StepStatus::Warned => "warning",
        StepStatus::Failed => "failed",
    }
}
