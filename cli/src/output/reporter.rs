//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY, `step()` starts a spinner that the next `success()`, `info()` or
/// `warn()` finishes in place. Elsewhere each call prints one line:
///
/// - `step()` prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `info()` prints `"  ℹ {message}"`
/// - `warn()` prints `"  ⚠ {message}"` to stderr
///
/// Everything but warnings is suppressed when `ctx.quiet` or `ctx.json`.
///
/// A spinner redraws over whatever else writes to the terminal, so callers
/// whose steps may stop at a `sudo` password prompt turn it off with
/// [`TerminalReporter::with_spinner`].
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: bool,
    active: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: true,
            active: RefCell::new(None),
        }
    }

    /// Enable or disable the animated spinner; line output is used without it.
    #[must_use]
    pub fn with_spinner(mut self, enabled: bool) -> Self {
        self.spinner = enabled;
        self
    }

    /// Whether `step()` starts a spinner.
    #[must_use]
    pub fn animates(&self) -> bool {
        self.spinner && self.ctx.show_progress()
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.active.borrow_mut().take()
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if let Some(pb) = self.take_spinner() {
            pb.finish_and_clear();
        }
        if self.animates() {
            *self.active.borrow_mut() = Some(progress::spinner(message));
        } else if self.ctx.human() {
            println!("  {} {message}", "→".style(self.ctx.styles.dim));
        }
    }

    fn success(&self, message: &str) {
        match self.take_spinner() {
            Some(pb) => progress::finish_ok(&pb, message),
            None => self.ctx.success(message),
        }
    }

    fn info(&self, message: &str) {
        match self.take_spinner() {
            Some(pb) => progress::finish_info(&pb, message),
            None => self.ctx.info(message),
        }
    }

    fn warn(&self, message: &str) {
        match self.take_spinner() {
            Some(pb) => progress::finish_warn(&pb, message),
            None => self.ctx.warn(message),
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        if let Some(pb) = self.active.get_mut().take() {
            pb.finish_and_clear();
        }
    }
}
