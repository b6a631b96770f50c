//! Detect command implementation.
//!
//! Prints the environment label on the first line so scripts can read it.

use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::host::Host;

/// The detect command implementation.
pub struct DetectCommand<'a> {
    host: &'a Host,
}

impl<'a> DetectCommand<'a> {
    /// Create a new detect command.
    pub fn new(host: &'a Host) -> Self {
        Self { host }
    }
}

impl Command for DetectCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let detected = self.host.environment();
        ui.message(detected.label.as_str());

        let via = ui
            .theme()
            .dim
            .apply_to(format!("detected via: {}", detected.detected_via))
            .to_string();
        ui.message(&via);

        if !detected.label.manages_services() {
            let note = ui
                .theme()
                .dim
                .apply_to("service unit and proxy steps will be skipped")
                .to_string();
            ui.message(&note);
        }
        Ok(CommandResult::success())
    }
}
