//! erpstack - Idempotent provisioning of an ERP application stack.
//!
//! erpstack brings a fresh Ubuntu host to a running application server
//! backed by PostgreSQL and fronted by nginx, as a fixed sequence of named
//! steps. Every step first checks whether its end state already holds, so
//! re-running against a provisioned host changes nothing.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Provisioning configuration, template rendering
//! - [`environment`] - Host environment detection and release checks
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Step sequencing and run results
//! - [`shell`] - Shell command execution
//! - [`steps`] - Step abstraction and the install/uninstall plans
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use erpstack::config::{render, TemplateVars};
//!
//! let vars = TemplateVars::new().with("user", "svcuser");
//! let line = render("db_user = ${user}", &vars).unwrap();
//! assert_eq!(line, "db_user = svcuser");
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod runner;
pub mod shell;
pub mod steps;
pub mod ui;

pub use error::{ProvisionError, Result};
