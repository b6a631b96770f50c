//! Host environment classification.
//!
//! Detection is split in two: [`HostSignals::collect`] reads the live host
//! once, and [`classify`] is a pure function over the collected signals.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Kernel-string signatures of a container/virtualization layer.
const KERNEL_SIGNATURES: &[&str] = &["microsoft", "wsl"];

/// Variables set by IDE-hosted remote workspaces.
const IDE_VARS: &[&str] = &[
    "CODESPACES",
    "GITPOD_WORKSPACE_ID",
    "REMOTE_CONTAINERS",
    "VSCODE_REMOTE_CONTAINERS_SESSION",
];

/// Variable set inside a WSL distribution.
const WSL_VAR: &str = "WSL_DISTRO_NAME";

/// The closed set of runtime contexts a host can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentLabel {
    /// Running under a container/virtualization layer (e.g. WSL).
    ContainerHosted,
    /// Running inside an IDE-hosted remote workspace.
    IdeHosted,
    /// Running on a cloud hypervisor instance.
    CloudInstance,
    /// Anything else: a regular server.
    Standard,
}

impl EnvironmentLabel {
    /// All labels in detection priority order.
    pub const ALL: [EnvironmentLabel; 4] = [
        EnvironmentLabel::ContainerHosted,
        EnvironmentLabel::IdeHosted,
        EnvironmentLabel::CloudInstance,
        EnvironmentLabel::Standard,
    ];

    /// Kebab-case name used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentLabel::ContainerHosted => "container-hosted",
            EnvironmentLabel::IdeHosted => "ide-hosted",
            EnvironmentLabel::CloudInstance => "cloud-instance",
            EnvironmentLabel::Standard => "standard",
        }
    }

    /// Whether the host runs a usable init system and public network
    /// listener, i.e. whether service units and the reverse proxy make sense.
    pub fn manages_services(&self) -> bool {
        matches!(
            self,
            EnvironmentLabel::CloudInstance | EnvironmentLabel::Standard
        )
    }
}

impl fmt::Display for EnvironmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified environment and the signal that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedEnvironment {
    /// The winning label.
    pub label: EnvironmentLabel,
    /// The file or variable that triggered detection, or `fallback`.
    pub detected_via: String,
}

impl DetectedEnvironment {
    fn new(label: EnvironmentLabel, detected_via: impl Into<String>) -> Self {
        Self {
            label,
            detected_via: detected_via.into(),
        }
    }
}

/// Raw host observations the classifier works from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostSignals {
    /// Kernel identification string (`/proc/version`).
    pub kernel: Option<String>,
    /// The subset of environment variables relevant to detection.
    pub env: BTreeMap<String, String>,
    /// Contents of `/sys/hypervisor/uuid`.
    pub hypervisor_uuid: Option<String>,
    /// Contents of `/sys/class/dmi/id/board_vendor`.
    pub board_vendor: Option<String>,
}

impl HostSignals {
    /// Collect signals from the live host.
    pub fn collect() -> Self {
        Self::collect_with(Path::new("/"), |key| std::env::var(key))
    }

    /// Collect signals below `root` using a custom env var lookup (for testing).
    pub fn collect_with<F>(root: &Path, env_fn: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let read = |rel: &str| {
            std::fs::read_to_string(root.join(rel))
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let env = IDE_VARS
            .iter()
            .chain(std::iter::once(&WSL_VAR))
            .filter_map(|key| env_fn(key).ok().map(|v| (key.to_string(), v)))
            .collect();

        Self {
            kernel: read("proc/version").or_else(|| read("proc/sys/kernel/osrelease")),
            env,
            hypervisor_uuid: read("sys/hypervisor/uuid"),
            board_vendor: read("sys/class/dmi/id/board_vendor"),
        }
    }

    /// Builder for synthetic signals: set the kernel string.
    pub fn with_kernel(mut self, kernel: impl Into<String>) -> Self {
        self.kernel = Some(kernel.into());
        self
    }

    /// Builder for synthetic signals: set an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Builder for synthetic signals: set the hypervisor UUID.
    pub fn with_hypervisor_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.hypervisor_uuid = Some(uuid.into());
        self
    }

    /// Builder for synthetic signals: set the DMI board vendor.
    pub fn with_board_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.board_vendor = Some(vendor.into());
        self
    }
}

/// Classify a host. Always yields exactly one label.
///
/// Signals are checked in priority order and the first match wins:
/// 1. container/virtualization signature in the kernel string
/// 2. IDE remote-workspace variables
/// 3. cloud hypervisor identifier
/// 4. `standard`
pub fn classify(signals: &HostSignals) -> DetectedEnvironment {
    let matches = matching_signals(signals);

    if matches.len() > 1 {
        let rest: Vec<String> = matches[1..]
            .iter()
            .map(|m| format!("{} ({})", m.label, m.detected_via))
            .collect();
        tracing::debug!(
            "Multiple environment signals matched; using {} and ignoring {}",
            matches[0].label,
            rest.join(", ")
        );
    }

    matches
        .into_iter()
        .next()
        .unwrap_or_else(|| DetectedEnvironment::new(EnvironmentLabel::Standard, "fallback"))
}

/// Detect the current host's environment.
pub fn detect() -> DetectedEnvironment {
    classify(&HostSignals::collect())
}

fn matching_signals(signals: &HostSignals) -> Vec<DetectedEnvironment> {
    let mut found = Vec::new();

    if let Some(kernel) = &signals.kernel {
        let lower = kernel.to_lowercase();
        if KERNEL_SIGNATURES.iter().any(|sig| lower.contains(sig)) {
            found.push(DetectedEnvironment::new(
                EnvironmentLabel::ContainerHosted,
                "/proc/version",
            ));
        }
    }
    if found.is_empty() && signals.env.contains_key(WSL_VAR) {
        found.push(DetectedEnvironment::new(
            EnvironmentLabel::ContainerHosted,
            WSL_VAR,
        ));
    }

    for var in IDE_VARS {
        let Some(value) = signals.env.get(*var) else {
            continue;
        };
        // Codespaces exports CODESPACES=true; anything else is not a signal.
        if *var == "CODESPACES" && value != "true" {
            continue;
        }
        found.push(DetectedEnvironment::new(EnvironmentLabel::IdeHosted, *var));
        break;
    }

    let ec2_uuid = signals
        .hypervisor_uuid
        .as_deref()
        .is_some_and(|uuid| uuid.to_lowercase().starts_with("ec2"));
    if ec2_uuid {
        found.push(DetectedEnvironment::new(
            EnvironmentLabel::CloudInstance,
            "/sys/hypervisor/uuid",
        ));
    } else if signals.board_vendor.as_deref() == Some("Amazon EC2") {
        found.push(DetectedEnvironment::new(
            EnvironmentLabel::CloudInstance,
            "/sys/class/dmi/id/board_vendor",
        ));
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    const WSL_KERNEL: &str = "Linux version 5.15.153.1-microsoft-standard-WSL2 (root@1c602f52c2e4)";
    const PLAIN_KERNEL: &str = "Linux version 6.8.0-45-generic (buildd@lcy02-amd64-075)";

    fn make_env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Result<String, std::env::VarError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned().ok_or(std::env::VarError::NotPresent)
    }

    #[test]
    fn empty_signals_fall_back_to_standard() {
        let result = classify(&HostSignals::default());
        assert_eq!(result.label, EnvironmentLabel::Standard);
        assert_eq!(result.detected_via, "fallback");
    }

    #[test]
    fn plain_kernel_is_standard() {
        let signals = HostSignals::default().with_kernel(PLAIN_KERNEL);
        assert_eq!(classify(&signals).label, EnvironmentLabel::Standard);
    }

    #[test]
    fn wsl_kernel_is_container_hosted() {
        let signals = HostSignals::default().with_kernel(WSL_KERNEL);
        let result = classify(&signals);
        assert_eq!(result.label, EnvironmentLabel::ContainerHosted);
        assert_eq!(result.detected_via, "/proc/version");
    }

    #[test]
    fn wsl_distro_var_is_container_hosted() {
        let signals = HostSignals::default()
            .with_kernel(PLAIN_KERNEL)
            .with_env("WSL_DISTRO_NAME", "Ubuntu-22.04");
        let result = classify(&signals);
        assert_eq!(result.label, EnvironmentLabel::ContainerHosted);
        assert_eq!(result.detected_via, "WSL_DISTRO_NAME");
    }

    #[test]
    fn codespaces_is_ide_hosted() {
        let signals = HostSignals::default().with_env("CODESPACES", "true");
        let result = classify(&signals);
        assert_eq!(result.label, EnvironmentLabel::IdeHosted);
        assert_eq!(result.detected_via, "CODESPACES");
    }

    #[test]
    fn codespaces_must_be_true() {
        let signals = HostSignals::default().with_env("CODESPACES", "false");
        assert_eq!(classify(&signals).label, EnvironmentLabel::Standard);
    }

    #[test]
    fn gitpod_is_ide_hosted() {
        let signals = HostSignals::default().with_env("GITPOD_WORKSPACE_ID", "abc123");
        assert_eq!(classify(&signals).label, EnvironmentLabel::IdeHosted);
    }

    #[test]
    fn ec2_uuid_is_cloud_instance() {
        let signals =
            HostSignals::default().with_hypervisor_uuid("EC2E1916-9099-7CAF-FD21-012345ABCDEF");
        let result = classify(&signals);
        assert_eq!(result.label, EnvironmentLabel::CloudInstance);
        assert_eq!(result.detected_via, "/sys/hypervisor/uuid");
    }

    #[test]
    fn non_ec2_uuid_is_standard() {
        let signals =
            HostSignals::default().with_hypervisor_uuid("4c4c4544-0042-3510-8052-b4c04f4e3232");
        assert_eq!(classify(&signals).label, EnvironmentLabel::Standard);
    }

    #[test]
    fn ec2_board_vendor_is_cloud_instance() {
        let signals = HostSignals::default().with_board_vendor("Amazon EC2");
        let result = classify(&signals);
        assert_eq!(result.label, EnvironmentLabel::CloudInstance);
        assert_eq!(result.detected_via, "/sys/class/dmi/id/board_vendor");
    }

    #[test]
    fn container_takes_priority_over_ide() {
        let signals = HostSignals::default()
            .with_kernel(WSL_KERNEL)
            .with_env("CODESPACES", "true");
        assert_eq!(classify(&signals).label, EnvironmentLabel::ContainerHosted);
    }

    #[test]
    fn container_takes_priority_over_cloud() {
        let signals = HostSignals::default()
            .with_kernel(WSL_KERNEL)
            .with_hypervisor_uuid("ec2abcd");
        assert_eq!(classify(&signals).label, EnvironmentLabel::ContainerHosted);
    }

    #[test]
    fn ide_takes_priority_over_cloud() {
        let signals = HostSignals::default()
            .with_env("GITPOD_WORKSPACE_ID", "ws")
            .with_board_vendor("Amazon EC2");
        assert_eq!(classify(&signals).label, EnvironmentLabel::IdeHosted);
    }

    #[test]
    fn classification_is_stable() {
        let signals = HostSignals::default()
            .with_kernel(PLAIN_KERNEL)
            .with_hypervisor_uuid("ec2-1234");
        assert_eq!(classify(&signals), classify(&signals));
    }

    #[test]
    fn collect_reads_files_below_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("proc")).unwrap();
        fs::create_dir_all(temp.path().join("sys/hypervisor")).unwrap();
        fs::write(temp.path().join("proc/version"), format!("{}\n", PLAIN_KERNEL)).unwrap();
        fs::write(temp.path().join("sys/hypervisor/uuid"), "ec2deadbeef\n").unwrap();

        let signals = HostSignals::collect_with(temp.path(), make_env(&[]));
        assert_eq!(signals.kernel.as_deref(), Some(PLAIN_KERNEL));
        assert_eq!(signals.hypervisor_uuid.as_deref(), Some("ec2deadbeef"));
        assert!(signals.board_vendor.is_none());
        assert_eq!(classify(&signals).label, EnvironmentLabel::CloudInstance);
    }

    #[test]
    fn collect_keeps_only_relevant_vars() {
        let temp = TempDir::new().unwrap();
        let signals = HostSignals::collect_with(
            temp.path(),
            make_env(&[("CODESPACES", "true"), ("HOME", "/root")]),
        );
        assert_eq!(signals.env.len(), 1);
        assert_eq!(signals.env.get("CODESPACES").map(String::as_str), Some("true"));
    }

    #[test]
    fn only_standard_and_cloud_manage_services() {
        let managed: Vec<_> = EnvironmentLabel::ALL
            .into_iter()
            .filter(EnvironmentLabel::manages_services)
            .collect();
        assert_eq!(
            managed,
            vec![EnvironmentLabel::CloudInstance, EnvironmentLabel::Standard]
        );
    }

    #[test]
    fn labels_display_kebab_case() {
        assert_eq!(EnvironmentLabel::ContainerHosted.to_string(), "container-hosted");
        assert_eq!(EnvironmentLabel::IdeHosted.to_string(), "ide-hosted");
        assert_eq!(EnvironmentLabel::CloudInstance.to_string(), "cloud-instance");
        assert_eq!(EnvironmentLabel::Standard.to_string(), "standard");
    }
}
