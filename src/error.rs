//! Error types for erpstack operations.
//!
//! This module defines [`ProvisionError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every variant is fatal to a provisioning run; nothing is retried
//! - Use `anyhow::Error` (via `ProvisionError::Other`) for unexpected errors
//! - Messages are written for the operator reading the terminal

use thiserror::Error;

/// Core error type for erpstack operations.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A step's "already satisfied?" query could not be evaluated.
    #[error("Step '{step}' precondition could not be evaluated: {message}")]
    PreconditionFailed { step: String, message: String },

    /// A step's action failed.
    #[error("Step '{step}' failed: {message}")]
    ActionFailed { step: String, message: String },

    /// The host is not one of the supported releases.
    #[error("Unsupported host: {found} (supported: Ubuntu 20.04, 22.04, 24.04)")]
    UnsupportedHost { found: String },

    /// The process is not running with root privileges.
    #[error("This command must be run as root (try: sudo erpstack ...)")]
    NotElevated,

    /// A configuration value is malformed.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A template could not be rendered.
    #[error("Template error: {message}")]
    Template { message: String },

    /// Shell command could not be run or exited unexpectedly.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for erpstack operations.
pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failed_displays_step_and_message() {
        let err = ProvisionError::PreconditionFailed {
            step: "ensure-database-role".into(),
            message: "psql: connection refused".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ensure-database-role"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn action_failed_displays_step_and_message() {
        let err = ProvisionError::ActionFailed {
            step: "install-system-packages".into(),
            message: "apt-get exited with code 100".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("install-system-packages"));
        assert!(msg.contains("code 100"));
    }

    #[test]
    fn unsupported_host_displays_release() {
        let err = ProvisionError::UnsupportedHost {
            found: "debian 12".into(),
        };
        assert!(err.to_string().contains("debian 12"));
    }

    #[test]
    fn not_elevated_mentions_root() {
        assert!(ProvisionError::NotElevated.to_string().contains("root"));
    }

    #[test]
    fn command_failed_displays_command_and_code() {
        let err = ProvisionError::CommandFailed {
            command: "systemctl daemon-reload".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("systemctl daemon-reload"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ProvisionError = io_err.into();
        assert!(matches!(err, ProvisionError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts_to_other() {
        let err: ProvisionError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, ProvisionError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
