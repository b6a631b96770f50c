//! Step outcomes and run results.

use crate::error::ProvisionError;
use std::fmt;
use std::time::Duration;

/// Which half of a step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePhase {
    /// The "already satisfied?" query could not be evaluated.
    Precondition,
    /// The action itself failed.
    Action,
}

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Where the failure happened.
    pub phase: FailurePhase,
    /// The underlying error, rendered for the operator.
    pub message: String,
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The precondition already held; the action was not invoked.
    SkippedAlreadySatisfied,
    /// The action ran and succeeded.
    Applied,
    /// The step failed and the run halted.
    Failed(StepFailure),
}

impl StepOutcome {
    /// Get a display character for this outcome.
    pub fn display_char(&self) -> char {
        match self {
            StepOutcome::SkippedAlreadySatisfied => '⊘',
            StepOutcome::Applied => '✓',
            StepOutcome::Failed(_) => '✗',
        }
    }

    /// Whether this is a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepOutcome::SkippedAlreadySatisfied => "skipped-already-satisfied",
            StepOutcome::Applied => "applied",
            StepOutcome::Failed(_) => "failed",
        };
        f.write_str(s)
    }
}

/// One entry in a run result.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Step name.
    pub name: String,
    /// What happened.
    pub outcome: StepOutcome,
    /// Time spent on check and action.
    pub duration: Duration,
}

impl StepRecord {
    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        let c = self.outcome.display_char();
        match &self.outcome {
            StepOutcome::Applied => {
                format!("{} {} ({})", c, self.name, format_duration(self.duration))
            }
            StepOutcome::SkippedAlreadySatisfied => {
                format!("{} {} (already satisfied)", c, self.name)
            }
            StepOutcome::Failed(failure) => format!("{} {} - {}", c, self.name, failure.message),
        }
    }
}

/// Ordered record of one sequencer run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    /// Outcomes in execution order. At most one is `Failed`, and it is last.
    pub records: Vec<StepRecord>,
    /// Steps omitted because they do not apply to the host environment.
    pub not_applicable: Vec<String>,
}

impl RunResult {
    /// Whether every step was applied or skipped.
    pub fn success(&self) -> bool {
        !self.records.iter().any(|r| r.outcome.is_failed())
    }

    /// The failed step, if any.
    pub fn failure(&self) -> Option<&StepRecord> {
        self.records.iter().find(|r| r.outcome.is_failed())
    }

    /// Outcomes without names or timings.
    pub fn outcomes(&self) -> Vec<&StepOutcome> {
        self.records.iter().map(|r| &r.outcome).collect()
    }

    /// Number of records with the given outcome kind.
    pub fn count(&self, outcome: &StepOutcome) -> usize {
        self.records
            .iter()
            .filter(|r| std::mem::discriminant(&r.outcome) == std::mem::discriminant(outcome))
            .count()
    }

    /// Convert a failed run into the matching [`ProvisionError`].
    pub fn into_result(self) -> crate::error::Result<Self> {
        let error = self.failure().and_then(|record| match &record.outcome {
            StepOutcome::Failed(failure) => Some(match failure.phase {
                FailurePhase::Precondition => ProvisionError::PreconditionFailed {
                    step: record.name.clone(),
                    message: failure.message.clone(),
                },
                FailurePhase::Action => ProvisionError::ActionFailed {
                    step: record.name.clone(),
                    message: failure.message.clone(),
                },
            }),
            _ => None,
        });
        match error {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

/// Result of evaluating one step's precondition without applying it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStep {
    /// Step name.
    pub name: String,
    /// `Ok(true)` already satisfied, `Ok(false)` would apply, `Err` could
    /// not be evaluated.
    pub satisfied: Result<bool, String>,
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}
