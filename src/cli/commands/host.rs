//! The machine a command runs against.

use crate::environment::{classify, ensure_supported, DetectedEnvironment, HostSignals, OsRelease};
use crate::error::{ProvisionError, Result};
use crate::shell::{is_elevated, CommandRunner, ShellRunner};

/// Host facts and the command runner, gathered once per invocation.
///
/// Commands never probe the live system directly, so tests can hand them a
/// fabricated host.
pub struct Host {
    /// Whether the process runs as root.
    pub elevated: bool,
    /// Parsed `/etc/os-release` (empty if it could not be read).
    pub release: OsRelease,
    /// Raw environment-detection signals.
    pub signals: HostSignals,
    /// Executes step commands.
    pub runner: Box<dyn CommandRunner>,
}

impl Host {
    /// Observe the live host.
    pub fn live() -> Self {
        let release = OsRelease::load().unwrap_or_else(|e| {
            tracing::debug!("Could not read /etc/os-release: {}", e);
            OsRelease::default()
        });

        Self {
            elevated: is_elevated(),
            release,
            signals: HostSignals::collect(),
            runner: Box::new(ShellRunner::new()),
        }
    }

    /// Fail unless running as root.
    pub fn require_elevated(&self) -> Result<()> {
        if self.elevated {
            Ok(())
        } else {
            Err(ProvisionError::NotElevated)
        }
    }

    /// Fail unless this is a supported release.
    pub fn require_supported(&self) -> Result<()> {
        ensure_supported(&self.release)
    }

    /// Classify this host.
    pub fn environment(&self) -> DetectedEnvironment {
        classify(&self.signals)
    }
}
