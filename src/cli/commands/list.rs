//! List command implementation.
//!
//! The `unity-installer list` command prints every version the catalog
//! publishes for the platform, oldest first.

use std::io::Write;

use crate::cli::args::ListArgs;
use crate::config::InstallerConfig;
use crate::error::Result;
use crate::release::{compare_versions, Releases, ReleaseSource};
use crate::ui::UserInterface;

use super::context::release_source;
use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    config: InstallerConfig,
    args: ListArgs,
}

impl ListCommand {
    pub fn new(config: &InstallerConfig, args: ListArgs) -> Self {
        Self {
            config: config.clone(),
            args,
        }
    }
}

/// Versions of `releases` in ascending version order.
pub fn sorted_versions(releases: &Releases) -> Vec<&str> {
    let mut versions: Vec<&str> = releases.keys().map(String::as_str).collect();
    versions.sort_by(|a, b| compare_versions(a, b));
    versions
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut spinner = ui.start_spinner("Fetching releases");
        let releases = match release_source(&self.config)
            .fetch_releases(&self.config.platform, !self.args.no_beta)
        {
            Ok(releases) => {
                spinner.finish_success(&format!("{} releases", releases.len()));
                releases
            }
            Err(e) => {
                spinner.finish_error("Failed to fetch releases");
                return Err(e);
            }
        };

        let mut stdout = std::io::stdout().lock();
        for version in sorted_versions(&releases) {
            writeln!(stdout, "{}", version)?;
        }
        Ok(CommandResult::success())
    }
}
