//! Installed-state inspection.

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{InstallerError, Result};
use crate::package::MODULES_FILE;
use crate::release::ModuleRelease;

/// Files whose presence marks an editor install, relative to its root.
pub const EDITOR_MARKERS: [&str; 3] = ["Editor/Unity.exe", "Unity/Unity.app", "Editor/Unity"];

/// What is on disk for one editor version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledState {
    pub installed: bool,

    /// The recorded module manifest, if one could be read.
    pub modules: Option<Vec<ModuleRelease>>,
}

impl InstalledState {
    /// IDs of modules recorded as installed.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.modules
            .iter()
            .flatten()
            .filter(|m| m.selected)
            .map(|m| m.id.as_str())
            .collect()
    }

    pub fn has_module(&self, id: &str) -> bool {
        self.modules
            .iter()
            .flatten()
            .any(|m| m.selected && m.id == id)
    }
}

/// Check whether an editor install exists at `editor_path`.
pub fn has_editor(editor_path: &Path) -> bool {
    EDITOR_MARKERS
        .iter()
        .any(|marker| editor_path.join(marker).exists())
}

/// Inspect the editor install at `editor_path`.
pub fn inspect(editor_path: &Path) -> Result<InstalledState> {
    if !has_editor(editor_path) {
        return Ok(InstalledState::default());
    }

    let manifest = editor_path.join(MODULES_FILE);
    let content = match fs::read_to_string(&manifest) {
        Ok(content) => content,
        Err(e) => {
            debug!("No readable module manifest at {}: {}", manifest.display(), e);
            return Ok(InstalledState {
                installed: true,
                modules: None,
            });
        }
    };

    let modules: Vec<ModuleRelease> =
        serde_json::from_str(&content).map_err(|e| InstallerError::StateRead {
            path: manifest.clone(),
            message: e.to_string(),
        })?;

    Ok(InstalledState {
        installed: true,
        modules: Some(modules),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn editor_dir(marker: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(marker);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
        temp
    }

    #[test]
    fn missing_editor_is_not_installed() {
        let temp = TempDir::new().unwrap();
        let state = inspect(&temp.path().join("2020.3.5f1")).unwrap();
        assert!(!state.installed);
        assert!(state.modules.is_none());
    }

    #[test]
    fn any_marker_counts() {
        for marker in EDITOR_MARKERS {
            let temp = editor_dir(marker);
            assert!(has_editor(temp.path()), "{} not recognised", marker);
        }
    }

    #[test]
    fn mac_bundle_directory_counts() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("Unity/Unity.app/Contents")).unwrap();
        assert!(has_editor(temp.path()));
    }

    #[test]
    fn missing_manifest_means_unknown_modules() {
        let temp = editor_dir("Editor/Unity");
        let state = inspect(temp.path()).unwrap();
        assert!(state.installed);
        assert!(state.modules.is_none());
        assert!(state.selected_ids().is_empty());
    }

    #[test]
    fn manifest_selection_is_reported() {
        let temp = editor_dir("Editor/Unity.exe");
        fs::write(
            temp.path().join(MODULES_FILE),
            r#"[{"id":"android","selected":true},{"id":"ios","selected":false}]"#,
        )
        .unwrap();

        let state = inspect(temp.path()).unwrap();
        assert_eq!(state.selected_ids(), vec!["android"]);
        assert!(state.has_module("android"));
        assert!(!state.has_module("ios"));
    }

    #[test]
    fn corrupt_manifest_is_state_error() {
        let temp = editor_dir("Editor/Unity");
        fs::write(temp.path().join(MODULES_FILE), "{ not json").unwrap();

        let err = inspect(temp.path()).unwrap_err();
        assert!(matches!(err, InstallerError::StateRead { .. }));
    }
}
