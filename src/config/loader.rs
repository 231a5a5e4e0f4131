//! Configuration file discovery and loading.

use crate::config::schema::InstallerConfig;
use crate::error::{InstallerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the user configuration file.
///
/// `<config_dir>/unity-installer/config.yml`
pub fn default_config_path() -> Option<PathBuf> {
    Some(
        dirs::config_dir()?
            .join("unity-installer")
            .join("config.yml"),
    )
}

/// Load a single config file.
///
/// # Errors
///
/// Returns `ConfigParse` if the file cannot be read or the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<InstallerConfig> {
    let content = fs::read_to_string(path).map_err(|e| InstallerError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into an [`InstallerConfig`].
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<InstallerConfig> {
    if content.trim().is_empty() {
        return Ok(InstallerConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| InstallerError::ConfigParse {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override.
///
/// An explicit path must exist. Otherwise the default location is used if
/// present, and built-in defaults if not.
pub fn load_config(config_override: Option<&Path>) -> Result<InstallerConfig> {
    if let Some(path) = config_override {
        return load_config_file(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => load_config_file(&path),
        _ => Ok(InstallerConfig::default()),
    }
}
