//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: InstallerConfig,
}

impl CommandDispatcher {
    /// Create a new dispatcher over the effective configuration.
    pub fn new(config: InstallerConfig) -> Self {
        Self { config }
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Install(args) => {
                let cmd = super::install::InstallCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::Apply(args) => {
                let cmd = super::apply::ApplyCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::Distill(args) => {
                let cmd = super::distill::DistillCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::List(args) => {
                let cmd = super::list::ListCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::Status(args) => {
                let cmd = super::status::StatusCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_keeps_config() {
        let config = InstallerConfig {
            platform: "linux".into(),
            ..Default::default()
        };
        let dispatcher = CommandDispatcher::new(config);
        assert_eq!(dispatcher.config().platform, "linux");
    }

    #[test]
    fn dispatch_routes_status() {
        use crate::ui::MockUI;
        use clap::Parser;

        let temp = tempfile::TempDir::new().unwrap();
        let config = InstallerConfig {
            install_path: temp.path().to_path_buf(),
            ..Default::default()
        };
        let cli = Cli::parse_from(["unity-installer", "status", "2020.3.5f1"]);
        let mut ui = MockUI::new();

        let result = CommandDispatcher::new(config).dispatch(&cli, &mut ui).unwrap();
        assert_eq!(result.exit_code, 1);
        assert!(ui.has_warning("Unity 2020.3.5f1 is not installed"));
    }
}
