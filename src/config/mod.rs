//! Configuration loading.
//!
//! Settings come from, in increasing priority:
//! 1. Built-in platform defaults
//! 2. The YAML file (`--config`, or `<config_dir>/unity-installer/config.yml`)
//! 3. Environment variables and command-line flags
//!
//! # Example
//!
//! ```
//! use unity_installer::config::{parse_config, ElevationMode};
//! use std::path::Path;
//!
//! let config = parse_config("elevation: never", Path::new("config.yml")).unwrap();
//! assert_eq!(config.elevation, ElevationMode::Never);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{default_config_path, load_config, load_config_file, parse_config};
pub use schema::{default_platform, ElevationMode, InstallerConfig};
