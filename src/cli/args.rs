//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct. Every provisioning option
//! falls back to an `ERP_*` environment variable and then a default.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{
    default_config_path, ProvisionConfig, DEFAULT_DOMAIN, DEFAULT_HTTP_PORT, DEFAULT_INSTALL_DIR,
    DEFAULT_REPO_URL, DEFAULT_SERVICE_NAME, DEFAULT_USER, DEFAULT_VERSION,
};
use crate::error::Result;

/// erpstack - Provision an ERP application server with its database and proxy.
#[derive(Debug, Parser)]
#[command(name = "erpstack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Options for `install` when no subcommand is given
    #[command(flatten)]
    pub provision: ProvisionArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install or converge the stack (default if no command specified)
    Install(ProvisionArgs),

    /// Remove the service, proxy site, config, role, account and files
    Uninstall(ProvisionArgs),

    /// Show which steps would run without changing anything
    Plan(PlanArgs),

    /// Print the detected environment label
    Detect,
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Install(_) => "install",
            Commands::Uninstall(_) => "uninstall",
            Commands::Plan(_) => "plan",
            Commands::Detect => "detect",
        }
    }
}

/// Values interpolated into every step.
#[derive(Debug, Clone, Args)]
pub struct ProvisionArgs {
    /// Public domain served by the proxy
    #[arg(long, env = "ERP_DOMAIN", default_value = DEFAULT_DOMAIN)]
    pub domain: String,

    /// System account and database role that runs the application
    #[arg(long, env = "ERP_USER", default_value = DEFAULT_USER)]
    pub user: String,

    /// Installation directory
    #[arg(long, env = "ERP_INSTALL_DIR", default_value = DEFAULT_INSTALL_DIR)]
    pub install_dir: PathBuf,

    /// Service unit and proxy site name
    #[arg(long, env = "ERP_SERVICE_NAME", default_value = DEFAULT_SERVICE_NAME)]
    pub service_name: String,

    /// Application branch or tag
    #[arg(long, env = "ERP_VERSION", default_value = DEFAULT_VERSION)]
    pub version_tag: String,

    /// Application git repository
    #[arg(long, env = "ERP_REPO_URL", default_value = DEFAULT_REPO_URL)]
    pub repo_url: String,

    /// Port the application listens on
    #[arg(long, env = "ERP_HTTP_PORT", default_value_t = DEFAULT_HTTP_PORT)]
    pub http_port: u16,

    /// Master password (default: keep the existing one, or generate)
    #[arg(long, env = "ERP_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Contact email for a TLS certificate (TLS is skipped when unset)
    #[arg(long, env = "ERP_TLS_EMAIL")]
    pub tls_email: Option<String>,

    /// Application config file (default: /etc/<service-name>.conf)
    #[arg(long, env = "ERP_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,
}

impl ProvisionArgs {
    /// Build and validate the configuration these arguments describe.
    ///
    /// Empty strings for optional values count as unset.
    pub fn to_config(&self) -> Result<ProvisionConfig> {
        let config = ProvisionConfig {
            domain: self.domain.clone(),
            user: self.user.clone(),
            install_dir: self.install_dir.clone(),
            service_name: self.service_name.clone(),
            version: self.version_tag.clone(),
            repo_url: self.repo_url.clone(),
            http_port: self.http_port,
            admin_password: non_empty(&self.admin_password),
            tls_email: non_empty(&self.tls_email),
            config_path: self
                .config_path
                .clone()
                .unwrap_or_else(|| default_config_path(&self.service_name)),
            ..ProvisionConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Evaluate the uninstall steps instead of the install steps
    #[arg(long)]
    pub uninstall: bool,

    #[command(flatten)]
    pub provision: ProvisionArgs,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
