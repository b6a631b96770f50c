//! System package installation.

use super::step::{Step, StepContext};
use crate::error::{ProvisionError, Result};
use crate::shell::quote;

const INSTALLED: &str = "install ok installed";

/// Install a set of apt packages.
#[derive(Debug, Clone)]
pub struct InstallPackages {
    name: String,
    packages: Vec<String>,
}

impl InstallPackages {
    /// Install `packages` under the step name `name`.
    pub fn new<I, S>(name: impl Into<String>, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            packages: packages.into_iter().map(Into::into).collect(),
        }
    }

    fn package_args(&self) -> String {
        self.packages
            .iter()
            .map(|p| quote(p))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Step for InstallPackages {
    fn name(&self) -> &str {
        &self.name
    }

    /// `dpkg-query` exits 1 when any package is unknown to dpkg, which
    /// just means "not installed yet".
    fn check(&self, ctx: &StepContext<'_>) -> Result<bool> {
        if self.packages.is_empty() {
            return Ok(true);
        }
        let command = format!(
            "dpkg-query -W -f='${{Status}}\\n' {}",
            self.package_args()
        );
        let result = ctx.runner.run(&command)?;
        match result.exit_code {
            Some(0) => {
                let installed = result
                    .stdout
                    .lines()
                    .filter(|line| line.trim() == INSTALLED)
                    .count();
                Ok(installed == self.packages.len())
            }
            Some(1) => Ok(false),
            code => Err(ProvisionError::CommandFailed { command, code }),
        }
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        ctx.runner.run_checked("apt-get update -q")?;
        ctx.runner.run_checked(&format!(
            "apt-get install -y -q --no-install-recommends {}",
            self.package_args()
        ))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvisionConfig;
    use crate::shell::{CommandResult, CommandRunner};
    use std::cell::RefCell;

    struct Scripted {
        response: CommandResult,
        seen: RefCell<Vec<String>>,
    }

    impl CommandRunner for Scripted {
        fn run(&self, command: &str) -> Result<CommandResult> {
            self.seen.borrow_mut().push(command.to_string());
            Ok(self.response.clone())
        }
    }

    fn check_with(response: CommandResult) -> Result<bool> {
        let runner = Scripted {
            response,
            seen: RefCell::new(Vec::new()),
        };
        let config = ProvisionConfig::default();
        let step = InstallPackages::new("install-system-packages", ["git", "nginx"]);
        step.check(&StepContext::new(&config, &runner))
    }

    #[test]
    fn all_installed_is_satisfied() {
        let out = "install ok installed\ninstall ok installed\n";
        assert!(check_with(CommandResult::with_code(0).with_stdout(out)).unwrap());
    }

    #[test]
    fn removed_package_is_not_satisfied() {
        let out = "install ok installed\ndeinstall ok config-files\n";
        assert!(!check_with(CommandResult::with_code(0).with_stdout(out)).unwrap());
    }

    #[test]
    fn unknown_package_is_not_satisfied() {
        assert!(!check_with(CommandResult::with_code(1)).unwrap());
    }

    #[test]
    fn missing_dpkg_is_an_error() {
        assert!(check_with(CommandResult::with_code(127)).is_err());
    }

    #[test]
    fn empty_package_list_is_satisfied() {
        let runner = Scripted {
            response: CommandResult::with_code(0),
            seen: RefCell::new(Vec::new()),
        };
        let config = ProvisionConfig::default();
        let step = InstallPackages::new("none", Vec::<String>::new());
        assert!(step.check(&StepContext::new(&config, &runner)).unwrap());
        assert!(runner.seen.borrow().is_empty());
    }

    #[test]
    fn apply_updates_then_installs() {
        let runner = Scripted {
            response: CommandResult::with_code(0),
            seen: RefCell::new(Vec::new()),
        };
        let config = ProvisionConfig::default();
        let step = InstallPackages::new("install-system-packages", ["git", "nginx"]);
        step.apply(&StepContext::new(&config, &runner)).unwrap();

        let seen = runner.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].starts_with("apt-get update"));
        assert!(seen[1].ends_with("git nginx"));
    }
}
