//! Project version detection.
//!
//! Reads `ProjectSettings/ProjectVersion.txt` from a Unity project to find the
//! editor version (and revision, when recorded) the project expects.

use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{InstallerError, Result};

/// The editor version a project was last saved with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectVersion {
    #[serde(rename = "m_EditorVersion")]
    pub editor_version: String,

    #[serde(rename = "m_EditorVersionWithRevision", default)]
    pub editor_version_with_revision: Option<String>,
}

static REVISION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-z.]+)\s*\(([A-Fa-f0-9]+)\)$").expect("valid revision pattern")
});

impl ProjectVersion {
    /// Load the version file from a project directory.
    pub fn from_project(project: &Path) -> Result<Self> {
        let path = project.join("ProjectSettings").join("ProjectVersion.txt");
        let content = fs::read_to_string(&path).map_err(|e| InstallerError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| InstallerError::ConfigParse {
            path,
            message: e.to_string(),
        })
    }

    /// Parse the YAML contents of `ProjectVersion.txt`.
    pub fn parse(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Version and revision, falling back to a bare version when no revision is recorded.
    pub fn version_and_revision(&self) -> (String, Option<String>) {
        let captures = self
            .editor_version_with_revision
            .as_deref()
            .and_then(|v| REVISION_PATTERN.captures(v.trim()));

        match captures {
            Some(c) => (c[1].to_string(), Some(c[2].to_string())),
            None => (self.editor_version.clone(), None),
        }
    }
}
