//! Unity editor installation engine.
//!
//! Installs Unity editor releases and their optional modules, skipping work
//! that is already done, and routes privileged installation steps through an
//! elevated worker process when required.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading
//! - [`engine`] - Reconciliation of requested versus installed state
//! - [`error`] - Error types and result aliases
//! - [`package`] - Installation of downloaded artifacts by file format
//! - [`release`] - Release catalog lookup and project version files
//! - [`service`] - Privileged execution through an elevated worker
//! - [`ui`] - Spinners, progress bars and terminal output
//!
//! # Example
//!
//! ```
//! use unity_installer::release::{compare_versions, ProjectVersion};
//! use std::cmp::Ordering;
//!
//! let project = ProjectVersion::parse(
//!     "m_EditorVersion: 2020.3.5f1\nm_EditorVersionWithRevision: 2020.3.5f1 (8095aa901b9b)\n",
//! )
//! .unwrap();
//! let (version, revision) = project.version_and_revision();
//! assert_eq!(version, "2020.3.5f1");
//! assert_eq!(revision.as_deref(), Some("8095aa901b9b"));
//!
//! assert_eq!(compare_versions("2020.3.10f1", "2020.3.5f1"), Ordering::Greater);
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod package;
pub mod release;
pub mod service;
pub mod ui;

pub use error::{InstallerError, Result};
