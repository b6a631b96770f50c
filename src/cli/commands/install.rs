//! Install command implementation.
//!
//! `erpstack install` (or bare `erpstack`) converges the host onto a
//! running stack. Re-running it on a provisioned host skips every step.

use crate::cli::args::ProvisionArgs;
use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::runner::{RunResult, Sequencer};
use crate::steps::{install_plan, Plan, StepContext};
use crate::ui::{render_run, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::host::Host;

/// The install command implementation.
pub struct InstallCommand<'a> {
    host: &'a Host,
    args: ProvisionArgs,
}

impl<'a> InstallCommand<'a> {
    /// Create a new install command.
    pub fn new(host: &'a Host, args: ProvisionArgs) -> Self {
        Self { host, args }
    }
}

impl Command for InstallCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.args.to_config()?;
        let result = run_plan(self.host, &config, install_plan(&config), "Installing", ui)?;

        if !result.success() {
            return Ok(CommandResult::failure(1));
        }

        let secured = result.records.iter().any(|r| r.name == "obtain-certificate");
        let scheme = if secured { "https" } else { "http" };
        ui.success(&format!(
            "{} is ready at {}://{}",
            config.service_name, scheme, config.domain
        ));
        ui.message(&format!(
            "Master password: admin_passwd in {}",
            config.config_path.display()
        ));
        Ok(CommandResult::success())
    }
}

/// Gate on privileges and release, then run `plan` and report each step.
pub(super) fn run_plan(
    host: &Host,
    config: &ProvisionConfig,
    plan: Plan,
    verb: &str,
    ui: &mut dyn UserInterface,
) -> Result<RunResult> {
    host.require_elevated()?;
    host.require_supported()?;
    let detected = host.environment();

    ui.show_header(&format!(
        "{} {} on {} ({} host)",
        verb,
        config.service_name,
        host.release.describe(),
        detected.label
    ));
    tracing::debug!("Environment detected via {}", detected.detected_via);

    let context = StepContext::new(config, host.runner.as_ref());
    let result = Sequencer::new(context, detected.label).run(&plan);

    let lines = render_run(&result, ui.theme());
    for line in &lines {
        ui.message(line);
    }

    if let Some(failed) = result.failure() {
        ui.error(&format!(
            "Stopped at '{}'. Fix the problem and re-run; completed steps will be skipped.",
            failed.name
        ));
    }

    Ok(result)
}
