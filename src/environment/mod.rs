//! Host environment detection.
//!
//! Classifies the host into exactly one [`EnvironmentLabel`]. The priority
//! chain is:
//!
//! 1. Container/virtualization signature in the kernel string (WSL)
//! 2. IDE remote-workspace variables (Codespaces, Gitpod, dev containers)
//! 3. Cloud hypervisor identifier (EC2)
//! 4. Fallback to `standard`
//!
//! [`release`] separately checks that the host runs a supported Ubuntu
//! release.

pub mod detection;
pub mod release;

pub use detection::{classify, detect, DetectedEnvironment, EnvironmentLabel, HostSignals};
pub use release::{ensure_supported, OsRelease, SUPPORTED_UBUNTU_RELEASES};
