//! System account steps.

use super::step::{probe, Step, StepContext};
use crate::error::Result;
use crate::shell::quote;
use std::path::PathBuf;

/// `getent` exit code for "key not found".
const GETENT_NOT_FOUND: i32 = 2;

fn account_exists(ctx: &StepContext<'_>, user: &str) -> Result<bool> {
    probe(
        ctx,
        &format!("getent passwd {}", quote(user)),
        &[0],
        &[GETENT_NOT_FOUND],
    )
}

/// Create a system account with its own group and home directory.
#[derive(Debug, Clone)]
pub struct EnsureSystemAccount {
    user: String,
    home: PathBuf,
}

impl EnsureSystemAccount {
    /// Ensure `user` exists with the given home directory.
    pub fn new(user: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            home: home.into(),
        }
    }
}

impl Step for EnsureSystemAccount {
    fn name(&self) -> &str {
        "ensure-system-account"
    }

    fn check(&self, ctx: &StepContext<'_>) -> Result<bool> {
        account_exists(ctx, &self.user)
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        ctx.runner.run_checked(&format!(
            "useradd --system --create-home --home-dir {} --shell /bin/bash --user-group --comment ERP {}",
            quote(&self.home.display().to_string()),
            quote(&self.user)
        ))?;
        Ok(())
    }
}

/// Delete a system account. The home directory is left in place.
#[derive(Debug, Clone)]
pub struct RemoveSystemAccount {
    user: String,
}

impl RemoveSystemAccount {
    /// Ensure `user` does not exist.
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

impl Step for RemoveSystemAccount {
    fn name(&self) -> &str {
        "remove-system-account"
    }

    fn check(&self, ctx: &StepContext<'_>) -> Result<bool> {
        account_exists(ctx, &self.user).map(|exists| !exists)
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        ctx.runner
            .run_checked(&format!("userdel {}", quote(&self.user)))?;
        Ok(())
    }
}
