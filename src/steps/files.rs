//! Templated file steps.
//!
//! Files are rendered whole and compared by SHA-256 with what is on disk.
//! Identical content means the step is already satisfied; any difference
//! means the file is backed up and rewritten, never merged.

use super::step::{Step, StepContext};
use crate::config::{render, template, template_vars, Template};
use crate::error::{ProvisionError, Result};
use crate::shell::quote;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ADMIN_PASSWD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*admin_passwd[ \t]*=[ \t]*(.*?)[ \t]*\r?$")
        .expect("ADMIN_PASSWD_REGEX must compile")
});

/// Bytes of OS randomness behind a generated password.
const PASSWORD_BYTES: usize = 24;

/// Render a template and keep it written to a path.
pub struct WriteTemplatedFile {
    name: String,
    path: PathBuf,
    template: Template,
    admin_password: Option<String>,
    mode: Option<u32>,
    owner: Option<String>,
    after_write: Vec<String>,
}

impl WriteTemplatedFile {
    fn new(name: &str, path: impl Into<PathBuf>, template: Template) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            template,
            admin_password: None,
            mode: None,
            owner: None,
            after_write: Vec::new(),
        }
    }

    /// The application config file.
    ///
    /// With no `admin_password`, the password already in the file is kept,
    /// or a random one is generated for a fresh file.
    pub fn config_file(path: impl Into<PathBuf>, admin_password: Option<String>) -> Self {
        let mut step = Self::new("write-config-file", path, Template::AppConfig);
        step.admin_password = admin_password;
        step.mode = Some(0o640);
        step
    }

    /// The systemd unit for the application.
    pub fn service_unit(path: impl Into<PathBuf>) -> Self {
        Self::new("write-service-unit", path, Template::ServiceUnit)
    }

    /// The reverse-proxy site.
    ///
    /// Once TLS is configured and the certificate exists, the TLS variant
    /// of the site is rendered instead.
    pub fn proxy_config(path: impl Into<PathBuf>) -> Self {
        Self::new("write-proxy-config", path, Template::ProxySite)
    }

    /// The reverse-proxy site, re-rendered after certificate issuance.
    pub fn tls_proxy_config(path: impl Into<PathBuf>) -> Self {
        Self::new("write-tls-proxy-config", path, Template::ProxySite)
    }

    /// Change group ownership of the written file to `group`.
    pub fn owned_by(mut self, group: impl Into<String>) -> Self {
        self.owner = Some(group.into());
        self
    }

    /// Run a command after each rewrite.
    pub fn after_write(mut self, command: impl Into<String>) -> Self {
        self.after_write.push(command.into());
        self
    }

    /// Render the file content for the current host state.
    pub fn render(&self, ctx: &StepContext<'_>) -> Result<String> {
        let password = self.resolve_admin_password(ctx)?;
        render(
            template(self.effective_template(ctx)?)?,
            &template_vars(ctx.config, &password),
        )
    }

    fn effective_template(&self, ctx: &StepContext<'_>) -> Result<Template> {
        let config = ctx.config;
        if self.template == Template::ProxySite
            && config.tls_enabled()
            && config.certificate_path().try_exists()?
        {
            Ok(Template::ProxySiteTls)
        } else {
            Ok(self.template)
        }
    }

    fn resolve_admin_password(&self, ctx: &StepContext<'_>) -> Result<String> {
        if self.template != Template::AppConfig {
            return Ok(String::new());
        }
        if let Some(password) = self.admin_password.as_ref().or(ctx.config.admin_password.as_ref()) {
            return Ok(password.clone());
        }
        if let Some(existing) = read_optional(&self.path)? {
            if let Some(password) = existing_admin_password(&existing) {
                return Ok(password);
            }
        }
        generate_password()
    }
}

impl Step for WriteTemplatedFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, ctx: &StepContext<'_>) -> Result<bool> {
        let Some(existing) = read_optional(&self.path)? else {
            return Ok(false);
        };
        let rendered = self.render(ctx)?;
        Ok(digest(existing.as_bytes()) == digest(rendered.as_bytes()))
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        let content = self.render(ctx)?;
        write_with_backup(&self.path, &content, self.mode)?;

        let path = quote(&self.path.display().to_string());
        if let Some(group) = &self.owner {
            ctx.runner
                .run_checked(&format!("chown root:{} {}", quote(group), path))?;
        }
        for command in &self.after_write {
            ctx.runner.run_checked(command)?;
        }
        Ok(())
    }
}

/// Delete a file, keeping a timestamped backup next to it.
#[derive(Debug, Clone)]
pub struct RemoveFile {
    name: String,
    path: PathBuf,
    after_remove: Vec<String>,
}

impl RemoveFile {
    /// Ensure nothing exists at `path`.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            after_remove: Vec::new(),
        }
    }

    /// Run a command after the file is removed.
    pub fn after_remove(mut self, command: impl Into<String>) -> Self {
        self.after_remove.push(command.into());
        self
    }
}

impl Step for RemoveFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, _ctx: &StepContext<'_>) -> Result<bool> {
        match fs::symlink_metadata(&self.path) {
            Ok(_) => Ok(false),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    fn apply(&self, ctx: &StepContext<'_>) -> Result<()> {
        let backup = backup_path(&self.path);
        fs::rename(&self.path, &backup)?;
        tracing::info!("Moved {} to {}", self.path.display(), backup.display());
        for command in &self.after_remove {
            ctx.runner.run_checked(command)?;
        }
        Ok(())
    }
}

/// Write `content` to `path`, first copying any differing previous version
/// to a timestamped backup. Returns the backup path if one was made.
///
/// With a `mode`, a new file is created with those permissions and an
/// existing one is switched to them after the write.
pub fn write_with_backup(path: &Path, content: &str, mode: Option<u32>) -> Result<Option<PathBuf>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let backup = match read_optional(path)? {
        Some(existing) if existing == content => return Ok(None),
        Some(_) => {
            let backup = backup_path(path);
            fs::copy(path, &backup)?;
            tracing::warn!(
                "Replacing {} (previous version saved as {})",
                path.display(),
                backup.display()
            );
            Some(backup)
        }
        None => None,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if let Some(mode) = mode {
            options.mode(mode);
        }
    }
    options.open(path)?.write_all(content.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = mode {
            fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(backup)
}

/// `<path>.<YYYYmmddHHMMSS>.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.bak", stamp));
    path.with_file_name(name)
}

/// Pull `admin_passwd` out of an existing application config.
pub fn existing_admin_password(content: &str) -> Option<String> {
    ADMIN_PASSWD_REGEX
        .captures(content)
        .map(|caps| caps[1].to_string())
        .filter(|password| !password.is_empty())
}

/// Hex-encoded random password from the OS RNG.
pub fn generate_password() -> Result<String> {
    let mut bytes = [0u8; PASSWORD_BYTES];
    fs::File::open("/dev/urandom")?.read_exact(&mut bytes)?;
    Ok(hex::encode(bytes))
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProvisionError::Io(e)),
    }
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(&Sha256::digest(bytes)[..])
}
