//! unity-installer CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unity_installer::cli::{Cli, CommandDispatcher};
use unity_installer::config::load_config;
use unity_installer::service::{run_worker, WorkerArgs};
use unity_installer::ui::{create_ui, is_ci};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("unity_installer=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("unity_installer=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    // An elevated worker relaunch bypasses the normal CLI entirely.
    if let Some(worker) = WorkerArgs::parse(&raw) {
        init_tracing(false);
        return ExitCode::from(run_worker(&worker) as u8);
    }

    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("unity-installer starting with args: {:?}", cli);

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let mut ui = create_ui(!is_ci(), cli.output_mode());

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            return ExitCode::from(1);
        }
    };
    cli.apply_overrides(&mut config);

    let dispatcher = CommandDispatcher::new(config);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
