//! Moving installed trees to their final location.
//!
//! Some artifacts unpack into a versioned directory (`android-ndk-r19`) that
//! has to end up under a fixed name (`NDK`). The target may already exist,
//! may be an ancestor of the source, or may be missing entirely.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::error::{InstallerError, Result};

/// Lexically normalize a path, resolving `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match normalized.components().next_back() {
                    Some(Component::Normal(_)) => normalized.pop(),
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => true,
                    _ => false,
                };
                if !popped {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Move `from` to `to`, merging into an existing directory tree.
///
/// Entries from `from` replace non-directory entries of the same name in `to`.
/// A file that would replace an installed directory fails the relocation.
pub fn relocate(from: &Path, to: &Path) -> Result<()> {
    let error = |message: String| InstallerError::Relocation {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        message,
    };

    if from == to {
        return Ok(());
    }

    let source_meta =
        fs::metadata(from).map_err(|e| error(format!("cannot access source: {}", e)))?;

    if from.starts_with(to) {
        return relocate_into_ancestor(from, to).map_err(|e| error(e.to_string()));
    }

    let target_exists = match fs::metadata(to) {
        Ok(_) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(error(format!("cannot access target: {}", e))),
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| error(format!("failed to create target directory: {}", e)))?;
    }

    let result = if !source_meta.is_dir() || !target_exists {
        info!("Renaming {} to {}", from.display(), to.display());
        fs::rename(from, to)
    } else {
        info!("Merging {} into {}", from.display(), to.display());
        merge_directory(from, to)
    };

    result.map_err(|e| error(e.to_string()))
}

fn relocate_into_ancestor(from: &Path, to: &Path) -> io::Result<()> {
    let name = to
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staging = to.with_file_name(format!(".{}.relocate-{}", name, uuid::Uuid::new_v4()));

    debug!("Staging {} at {}", from.display(), staging.display());
    fs::rename(from, &staging)?;

    let target_meta = fs::symlink_metadata(to)?;
    if !target_meta.is_dir() {
        fs::remove_file(to)?;
        fs::rename(&staging, to)
    } else if fs::read_dir(to)?.next().is_none() {
        fs::remove_dir(to)?;
        fs::rename(&staging, to)
    } else if fs::metadata(&staging)?.is_dir() {
        merge_directory(&staging, to)
    } else {
        let replaced = to.join(from.file_name().unwrap_or_default());
        fs::rename(&staging, replaced)
    }
}

/// Recursively move every entry of `src` into `dest`, then remove `src`.
///
/// Source entries replace files and symlinks but never an existing directory.
pub fn merge_directory(src: &Path, dest: &Path) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let entry_src = entry.path();
        let entry_dest = dest.join(entry.file_name());
        let src_is_dir = entry.file_type()?.is_dir();

        match fs::symlink_metadata(&entry_dest) {
            Ok(meta) if meta.is_dir() && src_is_dir => {
                merge_directory(&entry_src, &entry_dest)?;
            }
            Ok(meta) if meta.is_dir() => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!(
                        "refusing to replace directory {} with {}",
                        entry_dest.display(),
                        entry_src.display()
                    ),
                ));
            }
            Ok(_) => {
                fs::remove_file(&entry_dest)?;
                fs::rename(&entry_src, &entry_dest)?;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::rename(&entry_src, &entry_dest)?;
            }
            Err(e) => return Err(e),
        }
    }

    fs::remove_dir(src)
}
