//! Privileged execution gateway.
//!
//! On platforms where installs need elevated privileges, package operations
//! are forwarded to a single elevated worker process over a local JSON-lines
//! connection. Elsewhere the in-process [`LocalInstaller`] is used directly.

pub mod client;
pub mod elevate;
pub mod mutex;
pub mod protocol;
pub mod transport;
pub mod worker;

pub use client::ServiceInstaller;
pub use elevate::is_elevated;
pub use mutex::SystemMutex;
pub use worker::{run_worker, WorkerArgs};

use crate::config::InstallerConfig;
use crate::error::Result;
use crate::package::{LocalInstaller, PackageInstaller};

/// The package installer appropriate for this configuration and platform.
pub fn default_installer(config: &InstallerConfig) -> Result<Box<dyn PackageInstaller>> {
    if config.elevation.requires_worker() {
        let service = ServiceInstaller::launch(&config.elevation_command, &config.lock_path)?;
        Ok(Box::new(service))
    } else {
        Ok(Box::new(LocalInstaller::new()))
    }
}
