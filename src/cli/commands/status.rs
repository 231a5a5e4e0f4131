//! Status command implementation.
//!
//! The `unity-installer status` command reports whether a version is installed
//! and which modules its manifest records.

use serde::Serialize;
use std::io::Write;

use crate::cli::args::StatusArgs;
use crate::config::InstallerConfig;
use crate::engine::{inspect, InstalledState};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    config: InstallerConfig,
    args: StatusArgs,
}

impl StatusCommand {
    pub fn new(config: &InstallerConfig, args: StatusArgs) -> Self {
        Self {
            config: config.clone(),
            args,
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    version: &'a str,
    installed: bool,
    modules: Vec<&'a str>,
}

/// Human-readable lines describing `state`.
pub fn status_lines(state: &InstalledState) -> Vec<String> {
    match &state.modules {
        None => vec!["  (no module manifest)".to_string()],
        Some(modules) if modules.is_empty() => vec!["  (no modules)".to_string()],
        Some(modules) => modules
            .iter()
            .map(|m| {
                let mark = if m.selected { "[x]" } else { "[ ]" };
                if m.name.is_empty() {
                    format!("  {} {}", mark, m.id)
                } else {
                    format!("  {} {} ({})", mark, m.id, m.name)
                }
            })
            .collect(),
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let version = self.args.version.as_str();
        let path = self.config.editor_path(version);
        let state = inspect(&path)?;

        let mut stdout = std::io::stdout().lock();
        if self.args.json {
            let report = StatusReport {
                version,
                installed: state.installed,
                modules: state.selected_ids(),
            };
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            writeln!(stdout, "{}", json)?;
        } else if state.installed {
            ui.show_header(&format!("Unity {} ({})", version, path.display()));
            for line in status_lines(&state) {
                writeln!(stdout, "{}", line)?;
            }
        }

        if !state.installed {
            ui.warning(&format!("Unity {} is not installed", version));
            return Ok(CommandResult::failure(1));
        }
        Ok(CommandResult::success())
    }
}
