//! Operating system release checks.

use crate::error::{ProvisionError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Ubuntu releases erpstack knows how to provision.
pub const SUPPORTED_UBUNTU_RELEASES: &[&str] = &["20.04", "22.04", "24.04"];

/// Parsed `/etc/os-release`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsRelease {
    fields: BTreeMap<String, String>,
}

impl OsRelease {
    /// Parse `KEY=value` lines. Values may be single- or double-quoted;
    /// comments and malformed lines are ignored.
    pub fn parse(content: &str) -> Self {
        let fields = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), unquote(value.trim())))
            .collect();
        Self { fields }
    }

    /// Read and parse a release file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Read and parse `/etc/os-release`.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("/etc/os-release"))
    }

    /// Distribution identifier (`ID`), lowercased.
    pub fn id(&self) -> Option<String> {
        self.fields.get("ID").map(|id| id.to_lowercase())
    }

    /// Release number (`VERSION_ID`).
    pub fn version_id(&self) -> Option<&str> {
        self.fields.get("VERSION_ID").map(String::as_str)
    }

    /// Human-readable name (`PRETTY_NAME`), falling back to `ID VERSION_ID`.
    pub fn describe(&self) -> String {
        if let Some(pretty) = self.fields.get("PRETTY_NAME") {
            return pretty.clone();
        }
        format!(
            "{} {}",
            self.id().unwrap_or_else(|| "unknown".to_string()),
            self.version_id().unwrap_or("unknown")
        )
    }

    /// Whether this is one of the supported Ubuntu releases.
    pub fn is_supported(&self) -> bool {
        self.id().as_deref() == Some("ubuntu")
            && self
                .version_id()
                .is_some_and(|v| SUPPORTED_UBUNTU_RELEASES.contains(&v))
    }
}

/// Fail with [`ProvisionError::UnsupportedHost`] for anything but a
/// supported Ubuntu release.
pub fn ensure_supported(release: &OsRelease) -> Result<()> {
    if release.is_supported() {
        Ok(())
    } else {
        Err(ProvisionError::UnsupportedHost {
            found: release.describe(),
        })
    }
}

fn unquote(value: &str) -> String {
    let stripped = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')));
    stripped.unwrap_or(value).to_string()
}
