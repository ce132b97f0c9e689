//! Step sequencer: records tagged step outcomes and decides abort vs. continue.

use anyhow::Result;

use crate::application::ports::ProgressReporter;
use crate::domain::step::{SequenceReport, StepOutcome, StepPolicy, StepRecord, StepStatus};

/// Collects step outcomes for one lifecycle sequence.
pub struct Sequencer<'a, R> {
    reporter: &'a R,
    report: SequenceReport,
}

impl<'a, R: ProgressReporter> Sequencer<'a, R> {
    #[must_use]
    pub fn new(reporter: &'a R) -> Self {
        Self {
            reporter,
            report: SequenceReport::default(),
        }
    }

    /// Fold a step result through its policy and record it.
    ///
    /// # Errors
    ///
    /// Returns the step's error, tagged with the step name, when the outcome
    /// is fatal. The sequence must stop.
    pub fn settle(
        &mut self,
        step: &'static str,
        policy: StepPolicy,
        result: Result<StepOutcome>,
    ) -> Result<()> {
        self.record(step, StepOutcome::from_result(result, policy))
    }

    /// Record an outcome and report it to the operator.
    ///
    /// # Errors
    ///
    /// Returns an error for [`StepOutcome::Fatal`].
    pub fn record(&mut self, step: &'static str, outcome: StepOutcome) -> Result<()> {
        let status = outcome.status();
        let message = match outcome {
            StepOutcome::Done(msg) => {
                self.reporter.success(&msg);
                msg
            }
            StepOutcome::Skipped(msg) => {
                self.reporter.info(&msg);
                msg
            }
            StepOutcome::Warning(msg) => {
                self.reporter.warn(&format!("{step}: {msg}"));
                msg
            }
            StepOutcome::Fatal(err) => return Err(self.fail(step, err)),
        };
        tracing::debug!(step, ?status, "step finished");
        self.report.steps.push(StepRecord {
            step,
            status,
            message,
        });
        Ok(())
    }

    /// Record a fatal failure and return the error the sequence aborts with.
    pub fn fail(&mut self, step: &'static str, err: anyhow::Error) -> anyhow::Error {
        tracing::debug!(step, error = %format!("{err:#}"), "fatal step");
        self.report.steps.push(StepRecord {
            step,
            status: StepStatus::Failed,
            message: format!("{err:#}"),
        });
        err.context(format!("{step} failed"))
    }

    /// The report so far.
    #[must_use]
    pub fn report(&self) -> &SequenceReport {
        &self.report
    }

    #[must_use]
    pub fn finish(self) -> SequenceReport {
        self.report
    }
}
