//! Launching the worker with elevated privileges.

use std::path::Path;
use std::process::{Child, Command};
use tracing::debug;

use crate::error::{InstallerError, Result};

/// Check if running with elevated privileges.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

/// Quote a string for a single-quoted PowerShell literal.
fn powershell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Build the launcher command for `exe args...`.
pub fn elevated_command(exe: &Path, args: &[String], elevation_command: &str) -> Result<Command> {
    if cfg!(windows) {
        let argument_list = args
            .iter()
            .map(|a| format!("\"{}\"", a))
            .collect::<Vec<_>>()
            .join(" ");
        let script = format!(
            "Start-Process -FilePath {} -ArgumentList {} -Verb RunAs -Wait -WindowStyle Hidden",
            powershell_quote(&exe.to_string_lossy()),
            powershell_quote(&argument_list),
        );

        let mut command = Command::new("powershell.exe");
        command.args(["-NoProfile", "-NonInteractive", "-Command", &script]);
        return Ok(command);
    }

    if is_elevated() {
        let mut command = Command::new(exe);
        command.args(args);
        return Ok(command);
    }

    let launcher = shell_words::split(elevation_command).map_err(|e| InstallerError::Elevation {
        message: format!("invalid elevation command '{}': {}", elevation_command, e),
    })?;
    let (program, launcher_args) = launcher.split_first().ok_or_else(|| InstallerError::Elevation {
        message: "elevation command is empty".to_string(),
    })?;

    let mut command = Command::new(program);
    command.args(launcher_args).arg(exe).args(args);
    Ok(command)
}

/// Start `exe args...` with elevated privileges.
pub fn spawn_elevated(exe: &Path, args: &[String], elevation_command: &str) -> Result<Child> {
    let mut command = elevated_command(exe, args, elevation_command)?;
    debug!("Launching elevated worker: {:?}", command);
    command.spawn().map_err(|e| InstallerError::Elevation {
        message: format!("failed to launch elevated worker: {}", e),
    })
}
