//! Operator-facing output.
//!
//! - [`UserInterface`] trait so commands can be tested without a terminal
//! - [`TerminalUI`] for real runs, [`MockUI`] for tests
//! - [`Theme`] and the run/plan renderers in [`summary`]

pub mod mock;
pub mod summary;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use summary::{render_plan, render_run, tally};
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, Theme};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Styles to use for pre-rendered lines.
    fn theme(&self) -> &Theme;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);
}
