//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Commands that talk to the release
//! catalog or install packages share the helpers in [`context`].

pub mod apply;
pub mod completions;
pub mod context;
pub mod dispatcher;
pub mod distill;
pub mod install;
pub mod list;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
