//! Tagged step results shared by the install and teardown sequences.

use serde::Serialize;

/// What a single lifecycle step reported.
#[derive(Debug)]
pub enum StepOutcome {
    /// The step changed something.
    Done(String),
    /// Nothing to do; the desired state already held.
    Skipped(String),
    /// The step failed but the sequence may continue.
    Warning(String),
    /// The step failed and the sequence must stop.
    ///
    /// Carries a typed `LifecycleError` whenever the failure has a kind.
    Fatal(anyhow::Error),
}

/// How a failing step affects the rest of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Abort the sequence.
    Fatal,
    /// Downgrade the failure to a warning and continue.
    BestEffort,
}

impl StepOutcome {
    /// Fold a step's `Result` into an outcome according to its policy.
    #[must_use]
    pub fn from_result(result: anyhow::Result<StepOutcome>, policy: StepPolicy) -> Self {
        match (result, policy) {
            (Ok(outcome), _) => outcome,
            (Err(e), StepPolicy::BestEffort) => Self::Warning(format!("{e:#}")),
            (Err(e), StepPolicy::Fatal) => Self::Fatal(e),
        }
    }

    #[must_use]
    pub fn status(&self) -> StepStatus {
        match self {
            Self::Done(_) => StepStatus::Succeeded,
            Self::Skipped(_) => StepStatus::Skipped,
            Self::Warning(_) => StepStatus::Warned,
            Self::Fatal(_) => StepStatus::Failed,
        }
    }
}

/// Observable status of a finished step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Skipped,
    Warned,
    Failed,
}

/// One line of a sequence report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: &'static str,
    pub status: StepStatus,
    pub message: String,
}

/// Everything a sequence did, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SequenceReport {
    pub steps: Vec<StepRecord>,
}

impl SequenceReport {
    /// Status recorded for `step`, if it ran.
    #[must_use]
    pub fn status_of(&self, step: &str) -> Option<StepStatus> {
        self.steps.iter().find(|r| r.step == step).map(|r| r.status)
    }

    /// Steps that ended with a warning.
    pub fn warnings(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|r| r.status == StepStatus::Warned)
    }
}
