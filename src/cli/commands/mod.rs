//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands act on
//! a [`Host`] gathered once by the dispatcher.

pub mod detect;
pub mod dispatcher;
pub mod host;
pub mod install;
pub mod plan;
pub mod uninstall;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use host::Host;
