//! Terminal stylesheet.

use owo_colors::Style;

use crate::domain::step::StepStatus;

/// Colors for human output. Every field is a plain style until
/// [`Styles::colorize`] runs, so `--no-color` needs no special casing.
#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    pub dim: Style,
    pub bold: Style,
    pub header: Style,
    /// Connection token; stands out so it is easy to copy.
    pub token: Style,
}

impl Styles {
    /// Switch every field to its colored style.
    pub fn colorize(&mut self) {
        *self = Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            info: Style::new().blue(),
            dim: Style::new().dimmed(),
            bold: Style::new().bold(),
            header: Style::new().bold().cyan(),
            token: Style::new().bold().magenta(),
        };
    }

    /// Style for a finished step's status label.
    #[must_use]
    pub fn for_status(&self, status: StepStatus) -> Style {
        match status {
            StepStatus::Succeeded => self.success,
            StepStatus::Skipped => self.dim,
            StepStatus::Warned => self.warning,
            StepStatus::Failed => self.error,
        }
    }
}
