//! Command-line interface for erpstack.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, PlanArgs, ProvisionArgs};
pub use commands::{Command, CommandDispatcher, CommandResult, Host};
