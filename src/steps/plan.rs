//! The install and uninstall step lists.
//!
//! Order is significant and fixed here; the sequencer never reorders.

use super::account::{EnsureSystemAccount, RemoveSystemAccount};
use super::check::Check;
use super::command::CommandStep;
use super::database::{DropDatabaseRole, EnsureDatabaseRole};
use super::files::{RemoveFile, WriteTemplatedFile};
use super::packages::InstallPackages;
use super::step::{ServiceManaged, Step};
use crate::config::{ProvisionConfig, BASE_PACKAGES, PROXY_PACKAGES};
use crate::shell::quote;
use std::path::Path;

/// An ordered list of steps.
pub type Plan = Vec<Box<dyn Step>>;

/// Marker written once the Python requirements installed cleanly.
const REQUIREMENTS_MARKER: &str = ".requirements-installed";

fn q(path: &Path) -> String {
    quote(&path.display().to_string())
}

fn as_user(config: &ProvisionConfig, command: &str) -> String {
    format!("runuser -u {} -- {}", quote(&config.user), command)
}

/// Steps that bring a host from nothing to a running stack.
pub fn install_plan(config: &ProvisionConfig) -> Plan {
    let user = quote(&config.user);
    let service = quote(&config.service_name);
    let source_dir = config.source_dir();
    let venv_dir = config.venv_dir();
    let marker = venv_dir.join(REQUIREMENTS_MARKER);
    let proxy_config = config.proxy_config_path();
    let proxy_enabled = config.proxy_enabled_path();

    let mut plan: Plan = vec![
        Box::new(InstallPackages::new(
            "install-system-packages",
            BASE_PACKAGES.iter().copied(),
        )),
        Box::new(ServiceManaged(InstallPackages::new(
            "install-proxy-packages",
            PROXY_PACKAGES.iter().copied(),
        ))),
        Box::new(EnsureSystemAccount::new(&config.user, &config.install_dir)),
        Box::new(CommandStep::new(
            "ensure-database-running",
            Check::CommandSucceeds("pg_isready -q".to_string()),
            "service postgresql start",
        )),
        Box::new(EnsureDatabaseRole::new(&config.user)),
        Box::new(CommandStep::new(
            "ensure-install-directory",
            Check::All(vec![
                Check::PathExists(config.install_dir.clone()),
                Check::PathExists(config.addons_dir()),
                Check::PathExists(config.data_dir()),
            ]),
            format!(
                "install -d -o {u} -g {u} -m 0755 {} {} {}",
                q(&config.install_dir),
                q(&config.addons_dir()),
                q(&config.data_dir()),
                u = user
            ),
        )),
        Box::new(CommandStep::new(
            "fetch-application-source",
            Check::PathExists(source_dir.join(".git")),
            as_user(
                config,
                &format!(
                    "git clone --depth 1 --branch {} {} {}",
                    quote(&config.version),
                    quote(&config.repo_url),
                    q(&source_dir)
                ),
            ),
        )),
        Box::new(
            CommandStep::new(
                "install-python-environment",
                Check::PathExists(marker.clone()),
                as_user(
                    config,
                    &format!("{} -m venv {}", quote(&config.python), q(&venv_dir)),
                ),
            )
            .then(as_user(
                config,
                &format!(
                    "{} install -q --upgrade pip wheel",
                    q(&venv_dir.join("bin/pip"))
                ),
            ))
            .then(as_user(
                config,
                &format!(
                    "{} install -q -r {}",
                    q(&venv_dir.join("bin/pip")),
                    q(&source_dir.join("requirements.txt"))
                ),
            ))
            .then(as_user(config, &format!("touch {}", q(&marker)))),
        ),
        Box::new(CommandStep::new(
            "ensure-log-directory",
            Check::PathExists(config.log_dir()),
            format!(
                "install -d -o {u} -g {u} -m 0750 {}",
                q(&config.log_dir()),
                u = user
            ),
        )),
        Box::new(
            WriteTemplatedFile::config_file(&config.config_path, config.admin_password.clone())
                .owned_by(&config.user),
        ),
        Box::new(ServiceManaged(
            WriteTemplatedFile::service_unit(config.unit_path())
                .after_write("systemctl daemon-reload"),
        )),
        Box::new(ServiceManaged(CommandStep::new(
            "enable-service",
            Check::CommandSucceeds(format!("systemctl is-enabled --quiet {}", service)),
            format!("systemctl enable --now {}", service),
        ))),
        Box::new(ServiceManaged(
            WriteTemplatedFile::proxy_config(&proxy_config).after_write(reload_proxy_if_enabled(
                &proxy_enabled,
            )),
        )),
        Box::new(ServiceManaged(
            CommandStep::new(
                "enable-proxy-site",
                Check::SymlinkTo {
                    link: proxy_enabled.clone(),
                    target: proxy_config.clone(),
                },
                format!("ln -sfn {} {}", q(&proxy_config), q(&proxy_enabled)),
            )
            .then("nginx -t -q")
            .then("systemctl reload nginx"),
        )),
    ];

    if let Some(email) = config.tls_email.as_ref().filter(|_| config.tls_enabled()) {
        plan.push(Box::new(ServiceManaged(CommandStep::new(
            "obtain-certificate",
            Check::PathExists(config.certificate_path()),
            format!(
                "certbot certonly --nginx --non-interactive --agree-tos -m {} -d {}",
                quote(email),
                quote(&config.domain)
            ),
        ))));
        plan.push(Box::new(ServiceManaged(
            WriteTemplatedFile::tls_proxy_config(&proxy_config)
                .after_write(reload_proxy_if_enabled(&proxy_enabled)),
        )));
    }

    plan
}

/// Steps that take the stack back off a host.
///
/// System packages stay installed; the database role is dropped but
/// databases it owns must be removed first.
pub fn uninstall_plan(config: &ProvisionConfig) -> Plan {
    let service = quote(&config.service_name);
    let proxy_enabled = config.proxy_enabled_path();

    vec![
        Box::new(ServiceManaged(CommandStep::new(
            "disable-service",
            Check::CommandFails(format!("systemctl is-enabled --quiet {}", service)),
            format!("systemctl disable --now {}", service),
        ))),
        Box::new(ServiceManaged(
            RemoveFile::new("remove-service-unit", config.unit_path())
                .after_remove("systemctl daemon-reload"),
        )),
        Box::new(ServiceManaged(
            CommandStep::new(
                "disable-proxy-site",
                Check::PathAbsent(proxy_enabled.clone()),
                format!("rm -f {}", q(&proxy_enabled)),
            )
            .then("systemctl try-reload-or-restart nginx"),
        )),
        Box::new(ServiceManaged(RemoveFile::new(
            "remove-proxy-config",
            config.proxy_config_path(),
        ))),
        Box::new(RemoveFile::new("remove-config-file", &config.config_path)),
        Box::new(DropDatabaseRole::new(&config.user)),
        Box::new(RemoveSystemAccount::new(&config.user)),
        Box::new(CommandStep::new(
            "remove-install-directory",
            Check::PathAbsent(config.install_dir.clone()),
            format!("rm -rf -- {}", q(&config.install_dir)),
        )),
        Box::new(CommandStep::new(
            "remove-log-directory",
            Check::PathAbsent(config.log_dir()),
            format!("rm -rf -- {}", q(&config.log_dir())),
        )),
    ]
}

fn reload_proxy_if_enabled(enabled: &Path) -> String {
    format!(
        "if [ -e {} ]; then nginx -t -q && systemctl reload nginx; fi",
        q(enabled)
    )
}
