//! Uninstall command implementation.

use crate::cli::args::ProvisionArgs;
use crate::error::Result;
use crate::steps::uninstall_plan;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::host::Host;
use super::install::run_plan;

/// The uninstall command implementation.
///
/// System packages are left installed. Databases owned by the role must be
/// dropped beforehand or the role removal fails.
pub struct UninstallCommand<'a> {
    host: &'a Host,
    args: ProvisionArgs,
}

impl<'a> UninstallCommand<'a> {
    /// Create a new uninstall command.
    pub fn new(host: &'a Host, args: ProvisionArgs) -> Self {
        Self { host, args }
    }
}

impl Command for UninstallCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.args.to_config()?;
        let result = run_plan(self.host, &config, uninstall_plan(&config), "Removing", ui)?;

        if result.success() {
            ui.success(&format!("{} has been removed", config.service_name));
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
