//! In-process package installer.

use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use super::format::ArtifactKind;
use super::relocate::relocate;
use super::{resolve_template, PackageInstaller, MODULES_FILE};
use crate::error::{InstallerError, Result};
use crate::release::{InstallOptions, ModuleRelease};

/// Applies packages directly with the current process's privileges.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalInstaller;

impl LocalInstaller {
    pub fn new() -> Self {
        Self
    }
}

impl PackageInstaller for LocalInstaller {
    fn install_package(
        &self,
        artifact: &Path,
        destination: &Path,
        options: &InstallOptions,
    ) -> Result<()> {
        let started = Instant::now();
        info!("Installing package {}", artifact.display());

        let target = match &options.destination {
            Some(template) => resolve_template(template, destination),
            None => destination.to_path_buf(),
        };
        fs::create_dir_all(&target).map_err(|e| {
            InstallerError::from(
                anyhow::Error::new(e)
                    .context(format!("failed to create destination {}", target.display())),
            )
        })?;

        ArtifactKind::from_path(artifact).install(artifact, &target, options)?;

        if let Some((from, to)) = options.rename() {
            let from = resolve_template(from, destination);
            let to = resolve_template(to, destination);
            relocate(&from, &to)?;
        }

        info!(
            "Installed package {} in {:.1?}",
            artifact.display(),
            started.elapsed()
        );
        Ok(())
    }

    fn store_modules(&self, destination: &Path, modules: &[ModuleRelease]) -> Result<()> {
        fs::create_dir_all(destination)?;
        let path = destination.join(MODULES_FILE);
        let json = serde_json::to_string_pretty(modules).map_err(anyhow::Error::from)?;
        fs::write(&path, json)?;
        info!("Recorded {} modules in {}", modules.len(), path.display());
        Ok(())
    }
}
