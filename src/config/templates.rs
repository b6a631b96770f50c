//! Embedded file templates.

use super::interpolation::TemplateVars;
use super::settings::{path_str, ProvisionConfig};
use crate::error::{ProvisionError, Result};
use include_dir::{include_dir, Dir};

static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Files erpstack renders onto the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Application server configuration.
    AppConfig,
    /// systemd service unit.
    ServiceUnit,
    /// nginx reverse-proxy site.
    ProxySite,
    /// nginx reverse-proxy site terminating TLS.
    ProxySiteTls,
}

impl Template {
    /// File name inside the templates directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Template::AppConfig => "app.conf",
            Template::ServiceUnit => "app.service",
            Template::ProxySite => "nginx-site.conf",
            Template::ProxySiteTls => "nginx-site-tls.conf",
        }
    }
}

/// Load the raw text of an embedded template.
pub fn template(which: Template) -> Result<&'static str> {
    TEMPLATES_DIR
        .get_file(which.file_name())
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| ProvisionError::Template {
            message: format!("embedded template '{}' is missing", which.file_name()),
        })
}

/// Variables every template may reference.
pub fn template_vars(config: &ProvisionConfig, admin_password: &str) -> TemplateVars {
    TemplateVars::new()
        .with("user", &config.user)
        .with("domain", &config.domain)
        .with("service_name", &config.service_name)
        .with("install_dir", path_str(&config.install_dir))
        .with("source_dir", path_str(&config.source_dir()))
        .with("venv_dir", path_str(&config.venv_dir()))
        .with("addons_dir", path_str(&config.addons_dir()))
        .with("data_dir", path_str(&config.data_dir()))
        .with("log_file", path_str(&config.log_file()))
        .with("config_path", path_str(&config.config_path))
        .with("http_port", config.http_port.to_string())
        .with("certificate_path", path_str(&config.certificate_path()))
        .with("certificate_key_path", path_str(&config.certificate_key_path()))
        .with("admin_password", admin_password)
}
