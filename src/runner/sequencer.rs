//! Idempotent step sequencing.
//!
//! Steps run strictly in order. A step whose check already holds is
//! skipped without invoking its action; the first failure, in either the
//! check or the action, halts the run. There is no retry and no rollback:
//! a failed run leaves the host partially provisioned for the operator to
//! inspect, and re-running converges.

use super::result::{FailurePhase, PlannedStep, RunResult, StepFailure, StepOutcome, StepRecord};
use crate::environment::EnvironmentLabel;
use crate::steps::{Step, StepContext};
use std::time::Instant;
use tracing::{debug, error, info};

/// Runs an ordered list of steps against one host.
pub struct Sequencer<'a> {
    context: StepContext<'a>,
    environment: EnvironmentLabel,
}

impl<'a> Sequencer<'a> {
    /// Create a sequencer for a host classified as `environment`.
    pub fn new(context: StepContext<'a>, environment: EnvironmentLabel) -> Self {
        Self {
            context,
            environment,
        }
    }

    /// The environment this sequencer filters steps by.
    pub fn environment(&self) -> EnvironmentLabel {
        self.environment
    }

    /// Run every applicable step, halting on the first failure.
    pub fn run(&self, steps: &[Box<dyn Step>]) -> RunResult {
        let mut result = RunResult::default();

        for step in steps {
            let name = step.name();
            if !step.applies_to(self.environment) {
                info!("{}: not applicable on {} hosts", name, self.environment);
                result.not_applicable.push(name.to_string());
                continue;
            }

            let start = Instant::now();
            let outcome = self.run_step(step.as_ref());
            let halt = outcome.is_failed();

            result.records.push(StepRecord {
                name: name.to_string(),
                outcome,
                duration: start.elapsed(),
            });

            if halt {
                break;
            }
        }

        result
    }

    /// Evaluate every applicable step's check without applying anything.
    pub fn plan(&self, steps: &[Box<dyn Step>]) -> Vec<PlannedStep> {
        steps
            .iter()
            .filter(|step| step.applies_to(self.environment))
            .map(|step| PlannedStep {
                name: step.name().to_string(),
                satisfied: step.check(&self.context).map_err(|e| e.to_string()),
            })
            .collect()
    }

    fn run_step(&self, step: &dyn Step) -> StepOutcome {
        let name = step.name();

        match step.check(&self.context) {
            Ok(true) => {
                info!("{}: already satisfied", name);
                return StepOutcome::SkippedAlreadySatisfied;
            }
            Ok(false) => debug!("{}: not yet satisfied", name),
            Err(e) => {
                error!("{}: precondition could not be evaluated: {}", name, e);
                return StepOutcome::Failed(StepFailure {
                    phase: FailurePhase::Precondition,
                    message: e.to_string(),
                });
            }
        }

        info!("{}: applying", name);
        match step.apply(&self.context) {
            Ok(()) => {
                info!("{}: applied", name);
                StepOutcome::Applied
            }
            Err(e) => {
                error!("{}: failed: {}", name, e);
                StepOutcome::Failed(StepFailure {
                    phase: FailurePhase::Action,
                    message: e.to_string(),
                })
            }
        }
    }
}
