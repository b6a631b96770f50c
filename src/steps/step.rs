//! The step abstraction.

use crate::config::ProvisionConfig;
use crate::environment::EnvironmentLabel;
use crate::error::{ProvisionError, Result};
use crate::shell::CommandRunner;

/// Everything a step may read or call while checking or applying.
pub struct StepContext<'a> {
    /// Values to interpolate into commands and templates.
    pub config: &'a ProvisionConfig,
    /// The host command-execution collaborator.
    pub runner: &'a dyn CommandRunner,
}

impl<'a> StepContext<'a> {
    /// Create a context.
    pub fn new(config: &'a ProvisionConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }
}

/// A named, idempotent unit of provisioning work.
///
/// `check` answers "is this already done?" without changing anything;
/// `apply` makes it so. An `Err` from `check` means the question could not
/// be answered, which is a failure rather than a "no".
pub trait Step {
    /// Stable name, unique within a plan.
    fn name(&self) -> &str;

    /// Whether the step's end state already holds.
    fn check(&self, ctx: &StepContext<'_>) -> Result<bool>;

    /// Bring the host into the step's end state.
    fn apply(&self, ctx: &StepContext<'_>) -> Result<()>;

    /// Whether the step makes sense in the given environment.
    fn applies_to(&self, _environment: EnvironmentLabel) -> bool {
        true
    }
}

/// Restricts a step to environments that run services and a public proxy.
pub struct ServiceManaged<S>(pub S);

impl<S: Step> Step for ServiceManaged<S> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn check(&self, ctx: &StepContext<'_>) -> Result<bool> {
        self.0.check(ctx)
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        self.0.apply(ctx)
    }

    fn applies_to(&self, environment: EnvironmentLabel) -> bool {
        environment.manages_services() && self.0.applies_to(environment)
    }
}

/// Run a query command and map its exit code to yes/no.
///
/// Exit codes outside both lists (including signals) mean the query itself
/// failed.
pub(crate) fn probe(
    ctx: &StepContext<'_>,
    command: &str,
    yes_codes: &[i32],
    no_codes: &[i32],
) -> Result<bool> {
    let result = ctx.runner.run(command)?;
    match result.exit_code {
        Some(code) if yes_codes.contains(&code) => Ok(true),
        Some(code) if no_codes.contains(&code) => Ok(false),
        code => Err(ProvisionError::CommandFailed {
            command: format_probe_failure(command, &result.stderr),
            code,
        }),
    }
}

fn format_probe_failure(command: &str, stderr: &str) -> String {
    match stderr.trim() {
        "" => command.to_string(),
        err => format!("{} ({})", command, err),
    }
}
