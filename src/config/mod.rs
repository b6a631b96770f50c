//! Configuration and templating for erpstack.
//!
//! - Provisioning settings in [`settings`]
//! - Variable interpolation in [`interpolation`]
//! - Embedded file templates in [`templates`]
//!
//! # Example
//!
//! ```
//! use erpstack::config::ProvisionConfig;
//!
//! let config = ProvisionConfig {
//!     user: "svcuser".to_string(),
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! assert_eq!(config.unit_path().to_str(), Some("/etc/systemd/system/erp.service"));
//! ```

pub mod interpolation;
pub mod settings;
pub mod templates;

pub use interpolation::{extract_variables, parse_interpolation, render, Segment, TemplateVars};
pub use settings::{
    default_config_path, ProvisionConfig, BASE_PACKAGES, DEFAULT_DOMAIN, DEFAULT_HTTP_PORT,
    DEFAULT_INSTALL_DIR, DEFAULT_REPO_URL, DEFAULT_SERVICE_NAME, DEFAULT_USER, DEFAULT_VERSION,
    PROXY_PACKAGES,
};
pub use templates::{template, template_vars, Template};
