//! System-wide installer lock.
//!
//! Only one elevated worker may mutate installs at a time. The lock is an
//! exclusive advisory lock on a marker file and is released when the guard
//! (or the process) goes away.

use fs4::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{InstallerError, Result};

/// Holds the system-wide installer lock until dropped.
#[derive(Debug)]
pub struct SystemMutex {
    _file: File,
    path: PathBuf,
}

fn open_marker(path: &Path) -> Result<File> {
    let elevation_error = |e: std::io::Error| InstallerError::Elevation {
        message: format!("failed to open installer lock {}: {}", path.display(), e),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(elevation_error)?;
    }
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
        .map_err(elevation_error)
}

impl SystemMutex {
    /// Block until the lock at `path` is ours.
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = open_marker(path)?;
        let lock_error = |e: std::io::Error| InstallerError::Elevation {
            message: format!("failed to lock {}: {}", path.display(), e),
        };

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                info!("Waiting for another installer to finish ({})", path.display());
                file.lock_exclusive().map_err(lock_error)?;
            }
            Err(e) => return Err(lock_error(e)),
        }
        debug!("Acquired installer lock {}", path.display());

        Ok(Self {
            _file: file,
            path: path.to_path_buf(),
        })
    }

    /// Take the lock only if nobody else holds it.
    pub fn try_acquire(path: &Path) -> Result<Option<Self>> {
        let file = open_marker(path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self {
                _file: file,
                path: path.to_path_buf(),
            })),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(InstallerError::Elevation {
                message: format!("failed to lock {}: {}", path.display(), e),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
