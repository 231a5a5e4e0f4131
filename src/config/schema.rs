//! Configuration schema definitions.
//!
//! This module contains the struct definitions that map to the YAML
//! configuration file (`config.yml`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::release::http::{
    DEFAULT_ARCHIVE_ENDPOINT, DEFAULT_RELEASES_ENDPOINT, DEFAULT_TESTING_ARCHIVE_ENDPOINT,
};

/// When mutating operations are routed through an elevated worker.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ElevationMode {
    /// Elevate on platforms that need it for system-wide installs (Windows).
    #[default]
    Auto,
    /// Always go through the elevated worker.
    Always,
    /// Never elevate; install with the current privileges.
    Never,
}

impl ElevationMode {
    /// Whether this mode routes operations through the elevated worker.
    pub fn requires_worker(self) -> bool {
        match self {
            ElevationMode::Auto => cfg!(windows),
            ElevationMode::Always => true,
            ElevationMode::Never => false,
        }
    }
}

/// Root configuration structure for `config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Directory editors are installed into, one subdirectory per version.
    pub install_path: PathBuf,

    /// Catalog platform name: `win32`, `darwin` or `linux`.
    pub platform: String,

    /// Published release listing endpoint.
    pub releases_endpoint: String,

    /// Archive of generally available releases.
    pub archive_endpoint: String,

    /// Archive of alpha and beta releases.
    pub testing_archive_endpoint: String,

    pub elevation: ElevationMode,

    /// Program used to gain root on Unix (`sudo`, `doas`, ...).
    pub elevation_command: String,

    /// Marker file locked by the elevated worker.
    pub lock_path: PathBuf,

    /// Verify SHA-256 checksums of downloaded artifacts when the catalog provides one.
    #[serde(skip_serializing_if = "is_false")]
    pub verify_checksums: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            install_path: default_install_path(),
            platform: default_platform().to_string(),
            releases_endpoint: DEFAULT_RELEASES_ENDPOINT.to_string(),
            archive_endpoint: DEFAULT_ARCHIVE_ENDPOINT.to_string(),
            testing_archive_endpoint: DEFAULT_TESTING_ARCHIVE_ENDPOINT.to_string(),
            elevation: ElevationMode::default(),
            elevation_command: "sudo".to_string(),
            lock_path: default_lock_path(),
            verify_checksums: false,
        }
    }
}

impl InstallerConfig {
    /// Install root of one editor version.
    pub fn editor_path(&self, version: &str) -> PathBuf {
        self.install_path.join(version)
    }
}

/// Catalog platform name of the host.
pub fn default_platform() -> &'static str {
    if cfg!(windows) {
        "win32"
    } else if cfg!(target_os = "macos") {
        "darwin"
    } else {
        "linux"
    }
}

fn default_install_path() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\Program Files\Unity")
    } else if cfg!(target_os = "macos") {
        PathBuf::from("/Applications/Unity")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/opt"))
            .join("Unity")
    }
}

fn default_lock_path() -> PathBuf {
    if cfg!(windows) {
        std::env::var_os("PROGRAMDATA")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
            .join("UnityInstaller")
            .join("installer.lock")
    } else {
        // Only the root worker opens it, so it must not live in a world-writable directory.
        PathBuf::from("/var/run/unity-installer.lock")
    }
}

fn is_false(v: &bool) -> bool {
    !v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config: InstallerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, InstallerConfig::default());
        assert_eq!(config.elevation, ElevationMode::Auto);
        assert_eq!(config.elevation_command, "sudo");
        assert!(!config.verify_checksums);
    }

    #[test]
    fn parses_all_fields() {
        let yaml = r#"
install_path: /srv/unity
platform: linux
releases_endpoint: http://mirror/hub/
archive_endpoint: http://mirror/archive/
testing_archive_endpoint: http://mirror/beta/
elevation: never
elevation_command: doas
lock_path: /run/unity.lock
verify_checksums: true
"#;
        let config: InstallerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.install_path, PathBuf::from("/srv/unity"));
        assert_eq!(config.platform, "linux");
        assert_eq!(config.elevation, ElevationMode::Never);
        assert_eq!(config.elevation_command, "doas");
        assert!(config.verify_checksums);
    }

    #[cfg(unix)]
    #[test]
    fn default_lock_is_outside_shared_temp() {
        let lock = InstallerConfig::default().lock_path;
        assert_eq!(lock, PathBuf::from("/var/run/unity-installer.lock"));
        assert!(!lock.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn rejects_unknown_elevation_mode() {
        assert!(serde_yaml::from_str::<InstallerConfig>("elevation: sometimes").is_err());
    }

    #[test]
    fn explicit_modes_ignore_platform() {
        assert!(ElevationMode::Always.requires_worker());
        assert!(!ElevationMode::Never.requires_worker());
        assert_eq!(ElevationMode::Auto.requires_worker(), cfg!(windows));
    }

    #[test]
    fn editor_path_is_version_subdirectory() {
        let config = InstallerConfig {
            install_path: PathBuf::from("/opt/unity"),
            ..Default::default()
        };
        assert_eq!(
            config.editor_path("2020.3.5f1"),
            PathBuf::from("/opt/unity/2020.3.5f1")
        );
    }
}
