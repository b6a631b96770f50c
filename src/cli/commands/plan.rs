//! Plan command implementation.
//!
//! `erpstack plan` evaluates each step's check and reports what a run would
//! do. Nothing is applied, so root is not required; checks that need
//! privileges show up as "could not evaluate".

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::runner::Sequencer;
use crate::steps::{install_plan, uninstall_plan, StepContext};
use crate::ui::{render_plan, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::host::Host;

/// The plan command implementation.
pub struct PlanCommand<'a> {
    host: &'a Host,
    args: PlanArgs,
}

impl<'a> PlanCommand<'a> {
    /// Create a new plan command.
    pub fn new(host: &'a Host, args: PlanArgs) -> Self {
        Self { host, args }
    }
}

impl Command for PlanCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.args.provision.to_config()?;
        self.host.require_supported()?;
        let detected = self.host.environment();

        let (steps, action) = if self.args.uninstall {
            (uninstall_plan(&config), "uninstall")
        } else {
            (install_plan(&config), "install")
        };

        ui.show_header(&format!(
            "Plan: {} {} on {} ({} host)",
            action,
            config.service_name,
            self.host.release.describe(),
            detected.label
        ));

        let context = StepContext::new(&config, self.host.runner.as_ref());
        let planned = Sequencer::new(context, detected.label).plan(&steps);
        let lines = render_plan(&planned, ui.theme());
        for line in &lines {
            ui.message(line);
        }

        let pending = planned
            .iter()
            .filter(|p| !matches!(p.satisfied, Ok(true)))
            .count();
        if pending == 0 {
            ui.success("Nothing to do");
        } else {
            ui.message(&format!("{} of {} steps would run", pending, planned.len()));
        }

        Ok(CommandResult::success())
    }
}
