//! Shell command execution and privilege checks.

pub mod command;
pub mod platform;

pub use command::{execute, quote, CommandResult, CommandRunner, ShellRunner};
pub use platform::is_elevated;
