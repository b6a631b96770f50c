//! Steps expressed as a check plus a list of shell commands.

use super::check::Check;
use super::step::{Step, StepContext};
use crate::error::Result;

/// A step whose action is an ordered list of shell commands.
///
/// Commands run one at a time; the first non-zero exit fails the step.
#[derive(Debug, Clone)]
pub struct CommandStep {
    name: String,
    check: Check,
    commands: Vec<String>,
}

impl CommandStep {
    /// Create a step with a single action command.
    pub fn new(name: impl Into<String>, check: Check, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            check,
            commands: vec![command.into()],
        }
    }

    /// Append another action command.
    pub fn then(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// The action commands, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl Step for CommandStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, ctx: &StepContext<'_>) -> Result<bool> {
        tracing::debug!("{}: checking {}", self.name, self.check.describe());
        self.check.evaluate(ctx)
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        for command in &self.commands {
            ctx.runner.run_checked(command)?;
        }
        Ok(())
    }
}
