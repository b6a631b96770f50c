//! Shell command execution.

use crate::error::{ProvisionError, Result};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Create a result with the given exit code and no output.
    pub fn with_code(code: i32) -> Self {
        if code == 0 {
            Self::success(String::new(), String::new(), Duration::ZERO)
        } else {
            Self::failure(Some(code), String::new(), String::new(), Duration::ZERO)
        }
    }

    /// Attach captured stdout.
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Convert a non-zero exit into [`ProvisionError::CommandFailed`].
    pub fn into_checked(self, command: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(ProvisionError::CommandFailed {
                command: describe_failure(command, &self.stderr),
                code: self.exit_code,
            })
        }
    }
}

/// Runs a shell command and reports its exit status.
///
/// Every provisioning check and action goes through this trait, so steps
/// can be exercised against a recording fake instead of a real host.
/// `Err` means the command could not be started at all; a command that ran
/// and exited non-zero is an `Ok` result with `success == false`.
pub trait CommandRunner {
    /// Run a command through the shell.
    fn run(&self, command: &str) -> Result<CommandResult>;

    /// Run a command and fail unless it exits zero.
    fn run_checked(&self, command: &str) -> Result<CommandResult> {
        self.run(command)?.into_checked(command)
    }
}

/// [`CommandRunner`] backed by `/bin/sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a runner.
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandResult> {
        execute(command)
    }
}

/// Execute a shell command non-interactively, capturing stdout and stderr.
pub fn execute(command: &str) -> Result<CommandResult> {
    let start = Instant::now();
    tracing::debug!("$ {}", command);

    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(command)
        // Package managers must never stop to ask a question.
        .env("DEBIAN_FRONTEND", "noninteractive")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| spawn_failure(command, &e))?;

    let duration = start.elapsed();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if output.status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        tracing::debug!(
            "command exited with {:?}: {}",
            output.status.code(),
            stderr.trim()
        );
        Ok(CommandResult::failure(
            output.status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

/// Quote a value for safe interpolation into a POSIX shell command.
pub fn quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn spawn_failure(command: &str, error: &std::io::Error) -> ProvisionError {
    ProvisionError::CommandFailed {
        command: format!("{} (could not start /bin/sh: {})", command, error),
        code: None,
    }
}

fn describe_failure(command: &str, stderr: &str) -> String {
    match stderr.trim().lines().last() {
        Some(line) if !line.is_empty() => format!("{} ({})", command, line),
        _ => command.to_string(),
    }
}
