//! Provisioning steps.
//!
//! - [`Step`] - A named unit with a side-effect-free check and an action
//! - [`Check`] - Declarative "already satisfied?" queries
//! - [`CommandStep`] - A check plus a list of shell commands
//! - [`install_plan`] / [`uninstall_plan`] - The built-in step lists
//!
//! # Example
//!
//! ```no_run
//! use erpstack::config::ProvisionConfig;
//! use erpstack::shell::ShellRunner;
//! use erpstack::steps::{EnsureSystemAccount, Step, StepContext};
//!
//! let config = ProvisionConfig::default();
//! let runner = ShellRunner::new();
//! let ctx = StepContext::new(&config, &runner);
//!
//! let step = EnsureSystemAccount::new("svcuser", "/opt/erp");
//! if !step.check(&ctx).unwrap() {
//!     step.apply(&ctx).unwrap();
//! }
//! ```

pub mod account;
pub mod check;
pub mod command;
pub mod database;
pub mod files;
pub mod packages;
pub mod plan;
pub mod step;

pub use account::{EnsureSystemAccount, RemoveSystemAccount};
pub use check::Check;
pub use command::CommandStep;
pub use database::{DropDatabaseRole, EnsureDatabaseRole};
pub use files::{
    backup_path, existing_admin_password, generate_password, write_with_backup, RemoveFile,
    WriteTemplatedFile,
};
pub use packages::InstallPackages;
pub use plan::{install_plan, uninstall_plan, Plan};
pub use step::{ServiceManaged, Step, StepContext};
