//! Editor and module installation into the install root.

use std::path::{Path, PathBuf};
use tracing::info;

use super::download::Downloader;
use super::inspect::{inspect, InstalledState};
use crate::error::{InstallerError, Result};
use crate::package::PackageInstaller;
use crate::release::{EditorRelease, ModuleRelease};

const UNITY_PATH: &str = "{UNITY_PATH}";

/// Downloads releases and applies them through a [`PackageInstaller`].
pub struct EditorInstaller<I> {
    install_path: PathBuf,
    installer: I,
    downloader: Downloader,
}

impl<I: PackageInstaller> EditorInstaller<I> {
    pub fn new(install_path: impl Into<PathBuf>, installer: I, downloader: Downloader) -> Self {
        Self {
            install_path: install_path.into(),
            installer,
            downloader,
        }
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    /// Install root of one editor version.
    pub fn editor_path(&self, version: &str) -> PathBuf {
        self.install_path.join(version)
    }

    pub fn inspect(&self, version: &str) -> Result<InstalledState> {
        inspect(&self.editor_path(version))
    }

    /// Install the editor itself and reset its manifest.
    ///
    /// Every declared module is recorded as not installed, since a fresh editor
    /// install replaces whatever was there.
    pub fn install_editor(&self, release: &EditorRelease) -> Result<()> {
        let target = self.editor_path(&release.version);
        info!("Installing editor {} to {}", release.version, target.display());

        let mut options = release.package.install_options.clone();
        if options.destination.is_none() {
            options.destination = Some(UNITY_PATH.to_string());
        }

        let artifact = self.downloader.download(&release.package)?;
        let result = self.installer.install_package(&artifact, &target, &options);
        self.downloader.discard(&artifact);
        result?;

        let modules: Vec<ModuleRelease> = release
            .modules
            .iter()
            .map(|m| m.with_selected(false))
            .collect();
        self.installer.store_modules(&target, &modules)
    }

    /// Install one module into an existing editor and record it as selected.
    pub fn install_module(&self, release: &EditorRelease, module: &ModuleRelease) -> Result<()> {
        let state = self.inspect(&release.version)?;
        if !state.installed {
            return Err(InstallerError::EditorNotInstalled {
                version: release.version.clone(),
            });
        }

        let target = self.editor_path(&release.version);
        info!("Installing module {} for {}", module.id, release.version);

        let artifact = self.downloader.download(&module.package)?;
        let result =
            self.installer
                .install_package(&artifact, &target, &module.package.install_options);
        self.downloader.discard(&artifact);
        result?;

        let modules = merge_manifest(state.modules.unwrap_or_default(), release, module);
        self.installer.store_modules(&target, &modules)
    }

    /// Shut down the underlying package installer.
    pub fn close(&mut self) -> Result<()> {
        self.installer.close()
    }
}

/// The manifest after `installed` has been installed.
///
/// Existing entries keep their order and selection; modules the release
/// declares that the manifest lacks are appended unselected; `installed`
/// replaces its own entry or is appended, marked selected.
pub fn merge_manifest(
    existing: Vec<ModuleRelease>,
    release: &EditorRelease,
    installed: &ModuleRelease,
) -> Vec<ModuleRelease> {
    let mut modules: Vec<ModuleRelease> = Vec::with_capacity(existing.len() + release.modules.len());

    for module in existing {
        if !modules.iter().any(|m| m.id == module.id) {
            modules.push(module);
        }
    }
    for module in &release.modules {
        if !modules.iter().any(|m| m.id == module.id) {
            modules.push(module.with_selected(false));
        }
    }

    let entry = installed.with_selected(true);
    match modules.iter_mut().find(|m| m.id == entry.id) {
        Some(slot) => *slot = entry,
        None => modules.push(entry),
    }
    modules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: &str, selected: bool) -> ModuleRelease {
        ModuleRelease {
            id: id.to_string(),
            selected,
            ..Default::default()
        }
    }

    fn release(ids: &[&str]) -> EditorRelease {
        EditorRelease {
            version: "2020.3.5f1".into(),
            modules: ids.iter().map(|id| module(id, false)).collect(),
            ..Default::default()
        }
    }

    fn summary(modules: &[ModuleRelease]) -> Vec<(String, bool)> {
        modules.iter().map(|m| (m.id.clone(), m.selected)).collect()
    }

    #[test]
    fn installed_module_replaces_its_entry_in_place() {
        let existing = vec![module("android", false), module("ios", true)];
        let merged = merge_manifest(existing, &release(&["android", "ios"]), &module("android", false));

        assert_eq!(
            summary(&merged),
            vec![("android".into(), true), ("ios".into(), true)]
        );
    }

    #[test]
    fn declared_modules_are_added_unselected() {
        let merged = merge_manifest(Vec::new(), &release(&["android", "ios", "webgl"]), &module("ios", false));

        assert_eq!(
            summary(&merged),
            vec![
                ("android".into(), false),
                ("ios".into(), true),
                ("webgl".into(), false),
            ]
        );
    }

    #[test]
    fn unknown_manifest_entries_are_kept() {
        let existing = vec![module("legacy", true)];
        let merged = merge_manifest(existing, &release(&["android"]), &module("android", false));

        assert_eq!(
            summary(&merged),
            vec![("legacy".into(), true), ("android".into(), true)]
        );
    }

    #[test]
    fn duplicate_manifest_entries_collapse() {
        let existing = vec![module("ios", true), module("ios", false)];
        let merged = merge_manifest(existing, &release(&[]), &module("android", false));

        assert_eq!(
            summary(&merged),
            vec![("ios".into(), true), ("android".into(), true)]
        );
    }
}
