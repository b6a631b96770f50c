//! Provisioning configuration.
//!
//! [`ProvisionConfig`] is the single explicit source of every value a step
//! interpolates. It is built once from the parsed CLI arguments (which fall
//! back to environment variables and defaults) and passed into the step
//! context; steps never read ambient process state.

use crate::error::{ProvisionError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default public domain name.
pub const DEFAULT_DOMAIN: &str = "localhost";
/// Default system account that owns and runs the application.
pub const DEFAULT_USER: &str = "erp";
/// Default installation directory.
pub const DEFAULT_INSTALL_DIR: &str = "/opt/erp";
/// Default systemd service name.
pub const DEFAULT_SERVICE_NAME: &str = "erp";
/// Default application branch or tag.
pub const DEFAULT_VERSION: &str = "17.0";
/// Default application source repository.
pub const DEFAULT_REPO_URL: &str = "https://github.com/odoo/odoo.git";
/// Default application HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 8069;

/// Packages the application server needs regardless of environment.
pub const BASE_PACKAGES: &[&str] = &[
    "git",
    "python3",
    "python3-venv",
    "python3-dev",
    "python3-pip",
    "build-essential",
    "libpq-dev",
    "libxml2-dev",
    "libxslt1-dev",
    "libldap2-dev",
    "libsasl2-dev",
    "libjpeg-dev",
    "zlib1g-dev",
    "postgresql",
];

/// Packages for the reverse proxy and certificate issuance.
pub const PROXY_PACKAGES: &[&str] = &["nginx", "certbot", "python3-certbot-nginx"];

static ACCOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("ACCOUNT_REGEX must compile")
});

static DOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(localhost|(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}|\d{1,3}(?:\.\d{1,3}){3})$",
    )
    .expect("DOMAIN_REGEX must compile")
});

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("VERSION_REGEX must compile"));

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("EMAIL_REGEX must compile")
});

/// Everything a provisioning run needs to know about the target stack.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionConfig {
    /// Public domain served by the reverse proxy.
    pub domain: String,

    /// System account (and database role) that runs the application.
    pub user: String,

    /// Installation directory holding the source checkout and virtualenv.
    pub install_dir: PathBuf,

    /// Name of the systemd unit and the proxy site.
    pub service_name: String,

    /// Application branch or tag to check out.
    pub version: String,

    /// Git repository to clone the application from.
    pub repo_url: String,

    /// Port the application server listens on.
    pub http_port: u16,

    /// Master password written to the application config.
    ///
    /// `None` means "reuse the one already on disk, or generate one".
    pub admin_password: Option<String>,

    /// Contact email for certificate issuance. `None` disables TLS.
    pub tls_email: Option<String>,

    /// Application configuration file.
    pub config_path: PathBuf,

    /// Directory holding systemd unit files.
    pub unit_dir: PathBuf,

    /// Root of the nginx configuration tree.
    pub nginx_dir: PathBuf,

    /// Directory under which the service's log directory is created.
    pub log_root: PathBuf,

    /// Root of the certificate store.
    pub letsencrypt_dir: PathBuf,

    /// Python interpreter used to create the virtualenv.
    pub python: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            user: DEFAULT_USER.to_string(),
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            version: DEFAULT_VERSION.to_string(),
            repo_url: DEFAULT_REPO_URL.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            admin_password: None,
            tls_email: None,
            config_path: default_config_path(DEFAULT_SERVICE_NAME),
            unit_dir: PathBuf::from("/etc/systemd/system"),
            nginx_dir: PathBuf::from("/etc/nginx"),
            log_root: PathBuf::from("/var/log"),
            letsencrypt_dir: PathBuf::from("/etc/letsencrypt"),
            python: "python3".to_string(),
        }
    }
}

/// The default config file location for a service name.
pub fn default_config_path(service_name: &str) -> PathBuf {
    PathBuf::from(format!("/etc/{}.conf", service_name))
}

impl ProvisionConfig {
    /// Check every value that is interpolated into commands or file names.
    pub fn validate(&self) -> Result<()> {
        if !ACCOUNT_REGEX.is_match(&self.user) {
            return Err(invalid(format!(
                "account name '{}' must match {}",
                self.user,
                ACCOUNT_REGEX.as_str()
            )));
        }
        if !ACCOUNT_REGEX.is_match(&self.service_name) {
            return Err(invalid(format!(
                "service name '{}' must match {}",
                self.service_name,
                ACCOUNT_REGEX.as_str()
            )));
        }
        if !DOMAIN_REGEX.is_match(&self.domain) {
            return Err(invalid(format!("'{}' is not a valid domain", self.domain)));
        }
        if !VERSION_REGEX.is_match(&self.version) {
            return Err(invalid(format!(
                "'{}' is not a valid version tag",
                self.version
            )));
        }
        if !self.install_dir.is_absolute() {
            return Err(invalid(format!(
                "install directory '{}' must be absolute",
                self.install_dir.display()
            )));
        }
        if self.install_dir.components().count() < 3 {
            return Err(invalid(format!(
                "install directory '{}' is too close to the filesystem root",
                self.install_dir.display()
            )));
        }
        if !self.config_path.is_absolute() {
            return Err(invalid(format!(
                "config path '{}' must be absolute",
                self.config_path.display()
            )));
        }
        if self.http_port == 0 {
            return Err(invalid("HTTP port must be non-zero"));
        }
        if let Some(password) = &self.admin_password {
            if password.is_empty() || password.contains(['\n', '\r']) {
                return Err(invalid("admin password must be a single non-empty line"));
            }
            if password.trim() != password {
                return Err(invalid(
                    "admin password must not start or end with whitespace",
                ));
            }
        }
        if let Some(email) = &self.tls_email {
            if !EMAIL_REGEX.is_match(email) {
                return Err(invalid(format!("'{}' is not a valid email", email)));
            }
        }
        Ok(())
    }

    /// Checkout of the application source.
    pub fn source_dir(&self) -> PathBuf {
        self.install_dir.join("server")
    }

    /// Python virtualenv for the application.
    pub fn venv_dir(&self) -> PathBuf {
        self.install_dir.join("venv")
    }

    /// Directory for third-party addons.
    pub fn addons_dir(&self) -> PathBuf {
        self.install_dir.join("custom-addons")
    }

    /// Application data directory (filestore, sessions).
    pub fn data_dir(&self) -> PathBuf {
        self.install_dir.join("data")
    }

    /// Service log directory.
    pub fn log_dir(&self) -> PathBuf {
        self.log_root.join(&self.service_name)
    }

    /// Service log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join(format!("{}.log", self.service_name))
    }

    /// systemd unit file.
    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(format!("{}.service", self.service_name))
    }

    /// nginx site definition.
    pub fn proxy_config_path(&self) -> PathBuf {
        self.nginx_dir
            .join("sites-available")
            .join(&self.service_name)
    }

    /// nginx enabled-site symlink.
    pub fn proxy_enabled_path(&self) -> PathBuf {
        self.nginx_dir.join("sites-enabled").join(&self.service_name)
    }

    /// Certificate chain issued for the domain.
    pub fn certificate_path(&self) -> PathBuf {
        self.letsencrypt_dir
            .join("live")
            .join(&self.domain)
            .join("fullchain.pem")
    }

    /// Private key issued for the domain.
    pub fn certificate_key_path(&self) -> PathBuf {
        self.letsencrypt_dir
            .join("live")
            .join(&self.domain)
            .join("privkey.pem")
    }

    /// Whether certificate issuance is configured.
    pub fn tls_enabled(&self) -> bool {
        self.tls_email.is_some() && self.domain != DEFAULT_DOMAIN
    }
}

fn invalid(message: impl Into<String>) -> ProvisionError {
    ProvisionError::InvalidConfig {
        message: message.into(),
    }
}

/// Render a path for use in a template or shell command.
pub(crate) fn path_str(path: &Path) -> String {
    path.display().to_string()
}
