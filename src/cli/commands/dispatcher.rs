//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

use super::detect::DetectCommand;
use super::host::Host;
use super::install::InstallCommand;
use super::plan::PlanCommand;
use super::uninstall::UninstallCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Errors that stop the command before any step runs (privileges,
    /// release, configuration) are returned as `Err`; a step failure is an
    /// `Ok` failure result after the run summary has been shown.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    host: Host,
}

impl CommandDispatcher {
    /// Create a new dispatcher acting on `host`.
    pub fn new(host: Host) -> Self {
        Self { host }
    }

    /// Get the host commands act on.
    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Install(args)) => {
                InstallCommand::new(&self.host, args.clone()).execute(ui)
            }
            Some(Commands::Uninstall(args)) => {
                UninstallCommand::new(&self.host, args.clone()).execute(ui)
            }
            Some(Commands::Plan(args)) => PlanCommand::new(&self.host, args.clone()).execute(ui),
            Some(Commands::Detect) => DetectCommand::new(&self.host).execute(ui),
            None => InstallCommand::new(&self.host, cli.provision.clone()).execute(ui),
        }
    }
}
