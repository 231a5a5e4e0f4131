//! Release metadata types.
//!
//! These mirror the JSON published by the release catalog, so field names are
//! camelCase on the wire. The same types are written to `modules.json` and to
//! distilled install specs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placement and execution instructions for a single artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallOptions {
    /// Command line overriding the default silent install (`{INSTDIR}` is substituted).
    #[serde(rename = "cmd", default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Where the artifact lands (`{UNITY_PATH}` is substituted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Path moved to `rename_to` after installation.
    #[serde(default)]
    pub rename_from: Option<String>,

    /// Final path for `rename_from`.
    #[serde(default)]
    pub rename_to: Option<String>,

    /// Advisory artifact hash.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub checksum: String,
}

impl InstallOptions {
    /// Options that place an artifact at a fixed destination.
    pub fn with_destination(destination: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..Default::default()
        }
    }

    /// Both relocation templates, if the artifact needs relocating.
    pub fn rename(&self) -> Option<(&str, &str)> {
        match (&self.rename_from, &self.rename_to) {
            (Some(from), Some(to)) => Some((from.as_str(), to.as_str())),
            _ => None,
        }
    }
}

/// A downloadable artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(flatten)]
    pub install_options: InstallOptions,

    /// Artifact version. Editor releases carry their version on [`EditorRelease`]
    /// instead and leave this empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,

    #[serde(default)]
    pub download_url: String,

    #[serde(default)]
    pub download_size: u64,

    #[serde(default)]
    pub installed_size: u64,
}

/// An optional component tied to one editor version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRelease {
    #[serde(flatten)]
    pub package: Package,

    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,

    #[serde(default)]
    pub visible: bool,

    /// Whether the module is installed. Only the manifest writer flips this.
    #[serde(default)]
    pub selected: bool,
}

impl ModuleRelease {
    /// Copy of this module with the selection flag replaced.
    pub fn with_selected(&self, selected: bool) -> Self {
        Self {
            selected,
            ..self.clone()
        }
    }
}

/// A single release of the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRelease {
    #[serde(flatten)]
    pub package: Package,

    pub version: String,

    #[serde(default)]
    pub lts: bool,

    #[serde(default)]
    pub modules: Vec<ModuleRelease>,
}

impl EditorRelease {
    /// The first module with the given ID.
    pub fn find_module(&self, id: &str) -> Option<&ModuleRelease> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// IDs of modules flagged as selected, in declaration order.
    pub fn selected_module_ids(&self) -> Vec<String> {
        self.modules
            .iter()
            .filter(|m| m.selected)
            .map(|m| m.id.clone())
            .collect()
    }
}

/// Every release known at a point in time, keyed by version.
pub type Releases = BTreeMap<String, EditorRelease>;

#[cfg(test)]
mod tests {
    use super::*;

    const HUB_MODULE: &str = r#"{
        "id": "android",
        "name": "Android Build Support",
        "downloadUrl": "https://download.unity3d.com/android.pkg",
        "downloadSize": 1024,
        "installedSize": 4096,
        "destination": "{UNITY_PATH}/PlaybackEngines",
        "checksum": "abc",
        "visible": true,
        "selected": false
    }"#;

    #[test]
    fn module_reads_flattened_package_fields() {
        let module: ModuleRelease = serde_json::from_str(HUB_MODULE).unwrap();
        assert_eq!(module.id, "android");
        assert_eq!(module.package.download_size, 1024);
        assert_eq!(
            module.package.install_options.destination.as_deref(),
            Some("{UNITY_PATH}/PlaybackEngines")
        );
        assert_eq!(module.package.install_options.checksum, "abc");
        assert!(module.visible);
    }

    #[test]
    fn install_options_use_catalog_field_names() {
        let options = InstallOptions {
            command: Some("/S /D={INSTDIR}".into()),
            rename_from: Some("{UNITY_PATH}/a".into()),
            rename_to: Some("{UNITY_PATH}/b".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["cmd"], "/S /D={INSTDIR}");
        assert_eq!(json["renameFrom"], "{UNITY_PATH}/a");
        assert_eq!(json["renameTo"], "{UNITY_PATH}/b");
        assert!(json.get("destination").is_none());
    }

    #[test]
    fn rename_requires_both_templates() {
        let mut options = InstallOptions {
            rename_from: Some("a".into()),
            ..Default::default()
        };
        assert!(options.rename().is_none());
        options.rename_to = Some("b".into());
        assert_eq!(options.rename(), Some(("a", "b")));
    }

    #[test]
    fn editor_release_finds_modules_by_id() {
        let release = EditorRelease {
            version: "2020.3.5f1".into(),
            modules: vec![
                ModuleRelease {
                    id: "ios".into(),
                    ..Default::default()
                },
                ModuleRelease {
                    id: "android".into(),
                    selected: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert!(release.find_module("android").is_some());
        assert!(release.find_module("webgl").is_none());
        assert_eq!(release.selected_module_ids(), vec!["android".to_string()]);
    }

    #[test]
    fn with_selected_leaves_original_untouched() {
        let module = ModuleRelease {
            id: "webgl".into(),
            ..Default::default()
        };
        let selected = module.with_selected(true);
        assert!(selected.selected);
        assert!(!module.selected);
    }
}
