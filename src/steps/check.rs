//! Declarative "already satisfied?" checks.
//!
//! Checks never modify the host. A check that cannot be evaluated returns
//! an error instead of `false`, so the caller can tell "not done yet" from
//! "could not tell".

use super::step::StepContext;
use crate::error::{ProvisionError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Shell exit codes for "command not executable" and "command not found".
const SHELL_LAUNCH_FAILURES: &[i32] = &[126, 127];

/// A side-effect-free query of host state.
#[derive(Debug, Clone, PartialEq)]
pub enum Check {
    /// The path exists (file, directory, or symlink target).
    PathExists(PathBuf),

    /// Nothing exists at the path, not even a dangling symlink.
    PathAbsent(PathBuf),

    /// `link` is a symlink pointing at `target`.
    SymlinkTo { link: PathBuf, target: PathBuf },

    /// The command exits zero.
    CommandSucceeds(String),

    /// The command exits non-zero.
    CommandFails(String),

    /// Every nested check holds.
    All(Vec<Check>),
}

impl Check {
    /// Evaluate the check against the host.
    pub fn evaluate(&self, ctx: &StepContext<'_>) -> Result<bool> {
        match self {
            Check::PathExists(path) => Ok(path.try_exists()?),
            Check::PathAbsent(path) => path_absent(path),
            Check::SymlinkTo { link, target } => symlink_points_to(link, target),
            Check::CommandSucceeds(command) => command_succeeds(ctx, command),
            Check::CommandFails(command) => command_succeeds(ctx, command).map(|ok| !ok),
            Check::All(checks) => {
                for check in checks {
                    if !check.evaluate(ctx)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Short human-readable description.
    pub fn describe(&self) -> String {
        match self {
            Check::PathExists(path) => format!("exists: {}", path.display()),
            Check::PathAbsent(path) => format!("absent: {}", path.display()),
            Check::SymlinkTo { link, target } => {
                format!("{} -> {}", link.display(), target.display())
            }
            Check::CommandSucceeds(command) => format!("succeeds: {}", command),
            Check::CommandFails(command) => format!("fails: {}", command),
            Check::All(checks) => checks
                .iter()
                .map(Check::describe)
                .collect::<Vec<_>>()
                .join(" && "),
        }
    }
}

fn path_absent(path: &Path) -> Result<bool> {
    match std::fs::symlink_metadata(path) {
        Ok(_) => Ok(false),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
        Err(e) => Err(e.into()),
    }
}

fn symlink_points_to(link: &Path, target: &Path) -> Result<bool> {
    match std::fs::read_link(link) {
        Ok(actual) => Ok(actual == target),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        // Exists but is not a symlink.
        Err(e) if e.kind() == ErrorKind::InvalidInput => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn command_succeeds(ctx: &StepContext<'_>, command: &str) -> Result<bool> {
    let result = ctx.runner.run(command)?;
    match result.exit_code {
        Some(0) => Ok(true),
        Some(code) if !SHELL_LAUNCH_FAILURES.contains(&code) => Ok(false),
        code => Err(ProvisionError::CommandFailed {
            command: command.to_string(),
            code,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvisionConfig;
    use crate::shell::ShellRunner;
    use std::fs;
    use tempfile::TempDir;

    fn eval(check: &Check) -> Result<bool> {
        let config = ProvisionConfig::default();
        let runner = ShellRunner::new();
        check.evaluate(&StepContext::new(&config, &runner))
    }

    #[test]
    fn path_exists_and_absent() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("present");
        fs::write(&file, "").unwrap();
        let missing = temp.path().join("missing");

        assert!(eval(&Check::PathExists(file.clone())).unwrap());
        assert!(!eval(&Check::PathExists(missing.clone())).unwrap());
        assert!(!eval(&Check::PathAbsent(file)).unwrap());
        assert!(eval(&Check::PathAbsent(missing)).unwrap());
    }

    #[test]
    fn path_under_a_file_cannot_be_evaluated() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, "").unwrap();

        assert!(eval(&Check::PathExists(file.join("child"))).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_not_absent() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path().join("nowhere"), &link).unwrap();
        assert!(!eval(&Check::PathAbsent(link)).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlink_to_compares_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("site");
        let other = temp.path().join("other");
        let link = temp.path().join("enabled");
        fs::write(&target, "").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(eval(&Check::SymlinkTo {
            link: link.clone(),
            target
        })
        .unwrap());
        assert!(!eval(&Check::SymlinkTo {
            link,
            target: other
        })
        .unwrap());
    }

    #[test]
    fn symlink_to_regular_file_is_false() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, "").unwrap();
        assert!(!eval(&Check::SymlinkTo {
            link: file.clone(),
            target: file
        })
        .unwrap());
    }

    #[test]
    fn command_checks_use_exit_code() {
        assert!(eval(&Check::CommandSucceeds("exit 0".into())).unwrap());
        assert!(!eval(&Check::CommandSucceeds("exit 1".into())).unwrap());
        assert!(eval(&Check::CommandFails("exit 3".into())).unwrap());
    }

    #[test]
    fn missing_command_is_an_error_not_false() {
        let err = eval(&Check::CommandSucceeds(
            "definitely-not-a-real-command-xyz".into(),
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::CommandFailed {
                code: Some(127),
                ..
            }
        ));
        assert!(eval(&Check::CommandFails("definitely-not-a-real-command-xyz".into())).is_err());
    }

    #[test]
    fn all_short_circuits() {
        let temp = TempDir::new().unwrap();
        let check = Check::All(vec![
            Check::PathExists(temp.path().join("missing")),
            Check::CommandSucceeds("definitely-not-a-real-command-xyz".into()),
        ]);
        assert!(!eval(&check).unwrap());
    }

    #[test]
    fn describe_joins_nested_checks() {
        let check = Check::All(vec![
            Check::PathExists(PathBuf::from("/a")),
            Check::CommandSucceeds("true".into()),
        ]);
        assert_eq!(check.describe(), "exists: /a && succeeds: true");
    }
}
