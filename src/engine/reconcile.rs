//! Desired/actual state reconciliation.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

use super::cancel::CancelToken;
use super::editor::EditorInstaller;
use super::inspect::inspect;
use crate::error::{InstallerError, Result};
use crate::package::PackageInstaller;
use crate::release::EditorRelease;

/// What [`Reconciler::ensure_installed`] had to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The editor and every requested module were already present.
    AlreadySatisfied,
    /// Something was installed.
    Installed {
        editor: bool,
        modules: Vec<String>,
    },
}

/// Check whether the editor at `editor_path` has every module in `module_ids`.
///
/// Only reads the install, so callers can skip launching an elevated worker
/// when there is nothing to do.
pub fn has_editor_and_modules(editor_path: &Path, module_ids: &[String]) -> Result<bool> {
    let state = inspect(editor_path)?;
    if !state.installed {
        return Ok(false);
    }
    Ok(module_ids.iter().all(|id| state.has_module(id)))
}

/// Brings an editor install up to a requested module set.
pub struct Reconciler<I> {
    editors: EditorInstaller<I>,
    cancel: CancelToken,
}

impl<I: PackageInstaller> Reconciler<I> {
    pub fn new(editors: EditorInstaller<I>, cancel: CancelToken) -> Self {
        Self { editors, cancel }
    }

    pub fn editors(&self) -> &EditorInstaller<I> {
        &self.editors
    }

    /// Check whether `version` is installed with every module in `module_ids`.
    pub fn has_editor_and_modules(&self, version: &str, module_ids: &[String]) -> Result<bool> {
        has_editor_and_modules(&self.editors.editor_path(version), module_ids)
    }

    /// Install whatever is missing for `release` plus `module_ids`.
    ///
    /// Modules are installed in the given order. The first failure stops the
    /// run; modules installed before it stay installed.
    pub fn ensure_installed(
        &self,
        release: &EditorRelease,
        module_ids: &[String],
        force: bool,
    ) -> Result<Outcome> {
        let state = self.editors.inspect(&release.version)?;

        let mut editor = false;
        if !state.installed || force {
            self.cancel.check()?;
            self.editors.install_editor(release)?;
            editor = true;
        }

        let mut selected: HashSet<&str> = if force {
            HashSet::new()
        } else {
            state.selected_ids().into_iter().collect()
        };

        let mut installed = Vec::new();
        for id in module_ids {
            self.cancel.check()?;

            if selected.contains(id.as_str()) {
                debug!("Module {} already installed", id);
                continue;
            }

            let module = release
                .find_module(id)
                .ok_or_else(|| InstallerError::ModuleNotFound { module: id.clone() })?;

            self.editors.install_module(release, module)?;
            selected.insert(id.as_str());
            installed.push(id.clone());
        }

        if !editor && installed.is_empty() {
            info!("Editor {} already has every requested module", release.version);
            return Ok(Outcome::AlreadySatisfied);
        }

        Ok(Outcome::Installed {
            editor,
            modules: installed,
        })
    }

    /// Shut down the underlying package installer.
    pub fn close(&mut self) -> Result<()> {
        self.editors.close()
    }
}
