//! Step sequencing and run results.

pub mod result;
pub mod sequencer;

pub use result::{FailurePhase, PlannedStep, RunResult, StepFailure, StepOutcome, StepRecord};
pub use sequencer::Sequencer;
