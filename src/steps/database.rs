//! PostgreSQL role steps.

use super::step::{Step, StepContext};
use crate::error::{ProvisionError, Result};
use crate::shell::quote;

fn as_postgres(command: &str) -> String {
    format!("runuser -u postgres -- {}", command)
}

/// Query `pg_roles` for a role.
///
/// `psql` exits zero whether or not a row matched, so the answer is read
/// from stdout; a non-zero exit means the server could not be queried.
fn role_exists(ctx: &StepContext<'_>, role: &str) -> Result<bool> {
    let sql = format!("SELECT 1 FROM pg_roles WHERE rolname='{}'", role);
    let command = as_postgres(&format!("psql -tAc {}", quote(&sql)));
    let result = ctx.runner.run(&command)?;
    if !result.success {
        return Err(ProvisionError::CommandFailed {
            command: format!("{} ({})", command, result.stderr.trim()),
            code: result.exit_code,
        });
    }
    Ok(result.stdout.trim() == "1")
}

/// Create a database role allowed to create databases.
#[derive(Debug, Clone)]
pub struct EnsureDatabaseRole {
    role: String,
}

impl EnsureDatabaseRole {
    /// Ensure `role` exists.
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl Step for EnsureDatabaseRole {
    fn name(&self) -> &str {
        "ensure-database-role"
    }

    fn check(&self, ctx: &StepContext<'_>) -> Result<bool> {
        role_exists(ctx, &self.role)
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        ctx.runner.run_checked(&as_postgres(&format!(
            "createuser --createdb --no-createrole --no-superuser {}",
            quote(&self.role)
        )))?;
        Ok(())
    }
}

/// Drop a database role.
#[derive(Debug, Clone)]
pub struct DropDatabaseRole {
    role: String,
}

impl DropDatabaseRole {
    /// Ensure `role` does not exist.
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

impl Step for DropDatabaseRole {
    fn name(&self) -> &str {
        "drop-database-role"
    }

    fn check(&self, ctx: &StepContext<'_>) -> Result<bool> {
        role_exists(ctx, &self.role).map(|exists| !exists)
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        ctx.runner
            .run_checked(&as_postgres(&format!("dropuser {}", quote(&self.role))))?;
        Ok(())
    }
}
