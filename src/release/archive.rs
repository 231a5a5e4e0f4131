//! Archive metadata parsing.
//!
//! Archived releases are described by an INI file next to the artifacts:
//!
//! ```ini
//! [Unity]
//! title=Unity 2020.3.5f1
//! url=Windows64EditorInstaller/UnitySetup64-2020.3.5f1.exe
//! size=1500000
//! installedsize=5000000
//!
//! [Android]
//! title=Android Build Support
//! url=TargetSupportInstaller/UnitySetup-Android-Support.exe
//! ```
//!
//! The `[Unity]` section describes the editor; every other section is a module
//! whose ID is the lowercased section name.

use super::externals::{add_android_modules, module_destination, url_extension};
use super::http::join_slash;
use super::model::{EditorRelease, ModuleRelease, Package};
use crate::error::{InstallerError, Result};

const EDITOR_SECTION: &str = "Unity";

/// One `[section]` of an archive INI file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveSection {
    pub name: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub md5: String,
    pub installed_size: u64,
    pub download_size: u64,
    pub command: Option<String>,
}

impl ArchiveSection {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key.to_ascii_lowercase().as_str() {
            "title" => self.title = value.to_string(),
            "description" => self.description = value.to_string(),
            "url" => self.url = value.to_string(),
            "md5" => self.md5 = value.to_string(),
            "cmd" => self.command = Some(value.to_string()),
            "installedsize" => self.installed_size = parse_size(&self.name, key, value)?,
            "size" => self.download_size = parse_size(&self.name, key, value)?,
            _ => {}
        }
        Ok(())
    }

    fn package(&self, base_url: &str) -> Package {
        let download_url = if self.url.contains("://") {
            self.url.clone()
        } else {
            join_slash(base_url, &self.url)
        };

        let mut package = Package {
            download_url,
            download_size: self.download_size,
            installed_size: self.installed_size,
            ..Default::default()
        };
        package.install_options.command = self.command.clone();
        package.install_options.checksum = self.md5.clone();
        package
    }
}

fn parse_size(section: &str, key: &str, value: &str) -> Result<u64> {
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| InstallerError::Catalog {
        message: format!("failed to parse module {}: invalid {} '{}'", section, key, value),
    })
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse INI content into sections in declaration order.
///
/// Keys outside any section are ignored.
pub fn parse_sections(content: &str) -> Result<Vec<ArchiveSection>> {
    let mut sections: Vec<ArchiveSection> = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            sections.push(ArchiveSection {
                name: name.trim().to_string(),
                ..Default::default()
            });
            continue;
        }

        let Some(eq) = line.find('=') else {
            continue;
        };
        let key = line[..eq].trim();
        let value = unquote(line[eq + 1..].trim());

        if let Some(section) = sections.last_mut() {
            section.set(key, value)?;
        }
    }

    Ok(sections)
}

/// Build an editor release from archive metadata fetched from `archive_url`.
pub fn parse_archive(
    content: &str,
    archive_url: &str,
    platform: &str,
    version: &str,
) -> Result<EditorRelease> {
    let base_url = match archive_url.rfind('/') {
        Some(idx) => &archive_url[..=idx],
        None => "",
    };

    let mut sections = parse_sections(content)?;
    let editor_idx = sections
        .iter()
        .position(|s| s.name == EDITOR_SECTION)
        .ok_or_else(|| InstallerError::Catalog {
            message: format!("missing {} section in archive {}", EDITOR_SECTION, archive_url),
        })?;
    let editor = sections.remove(editor_idx);

    let mut release = EditorRelease {
        package: editor.package(base_url),
        version: version.to_string(),
        ..Default::default()
    };

    for section in sections {
        let id = section.name.to_lowercase();
        let mut package = section.package(base_url);
        package.install_options.destination =
            module_destination(platform, &id, url_extension(&section.url));

        release.modules.push(ModuleRelease {
            package,
            id,
            name: section.title,
            description: section.description,
            ..Default::default()
        });
    }

    add_android_modules(&mut release, platform);
    Ok(release)
}
