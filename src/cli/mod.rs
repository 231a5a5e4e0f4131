//! Command-line interface for the installer.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    ApplyArgs, Cli, Commands, CompletionsArgs, DistillArgs, InstallArgs, ListArgs, StatusArgs,
    VersionSelector,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
