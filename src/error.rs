//! Error types for installer operations.
//!
//! This module defines [`InstallerError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `InstallerError` for failures the reconciler and CLI report to the operator
//! - Use `anyhow::Error` (via `InstallerError::Other`) for unexpected glue failures
//! - Every message names the failing artifact, module or path plus the cause

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for installer operations.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Version or metadata lookup against the release catalog failed.
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// A requested module is not declared by the editor release.
    #[error("Missing module {module}")]
    ModuleNotFound { module: String },

    /// Downloading an artifact failed.
    #[error("Failed to download {url}: {message}")]
    Transfer { url: String, message: String },

    /// An archive or installer payload could not be extracted.
    #[error("Failed to extract {artifact}: {message}")]
    Extraction { artifact: PathBuf, message: String },

    /// A scripted installer or extraction tool exited unsuccessfully.
    #[error("Command failed with exit code {code:?}: {command}")]
    Subprocess { command: String, code: Option<i32> },

    /// Moving installed files to their final location failed.
    #[error("Failed to relocate {from} to {to}: {message}")]
    Relocation {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },

    /// The installed module manifest exists but could not be parsed.
    #[error("Failed to read installed state at {path}: {message}")]
    StateRead { path: PathBuf, message: String },

    /// The elevated worker could not be launched or could not take the installer lock.
    #[error("Elevation failed: {message}")]
    Elevation { message: String },

    /// The worker connection failed or closed before a response arrived.
    #[error("Installer service connection failed: {message}")]
    Ipc { message: String },

    /// A module install was requested for an editor that is not present.
    #[error("Editor {version} is not installed")]
    EditorNotInstalled { version: String },

    /// The operator interrupted the run between install steps.
    #[error("Installation cancelled")]
    Cancelled,

    /// Failed to parse a configuration or spec file.
    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InstallerError {
    /// Build an IPC error from anything displayable.
    pub fn ipc(message: impl std::fmt::Display) -> Self {
        Self::Ipc {
            message: message.to_string(),
        }
    }
}

/// Result type alias for installer operations.
pub type Result<T> = std::result::Result<T, InstallerError>;
