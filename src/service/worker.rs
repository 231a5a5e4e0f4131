//! Worker side of the privileged execution gateway.
//!
//! The worker is this same executable started with reserved flags. It
//! connects back to the caller, identifies itself, takes the system-wide
//! installer lock and then applies requests one at a time until the caller
//! hangs up.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use tracing::{debug, error, info};

use super::mutex::SystemMutex;
use super::protocol::{spawn_reader, spawn_writer, write_message, Hello, MessageReader, Request, Response};
use super::transport::Stream;
use crate::engine::cancel::ignore_interrupts;
use crate::error::{InstallerError, Result};
use crate::package::{LocalInstaller, PackageInstaller};

pub const SERVICE_FLAG: &str = "--package-service=";
pub const TOKEN_FLAG: &str = "--package-service-token=";
pub const LOCK_FLAG: &str = "--package-service-lock=";

/// Reserved command-line arguments of a worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerArgs {
    pub address: String,
    pub token: String,
    pub lock_path: PathBuf,
}

impl WorkerArgs {
    /// Recognize worker arguments. `None` unless the service flag is present.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Option<Self> {
        let mut address = None;
        let mut token = String::new();
        let mut lock_path = None;

        for arg in args {
            let arg = arg.as_ref();
            if let Some(value) = arg.strip_prefix(SERVICE_FLAG) {
                address = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix(TOKEN_FLAG) {
                token = value.to_string();
            } else if let Some(value) = arg.strip_prefix(LOCK_FLAG) {
                lock_path = Some(PathBuf::from(value));
            }
        }

        Some(Self {
            address: address?,
            token,
            lock_path: lock_path.unwrap_or_else(|| crate::config::InstallerConfig::default().lock_path),
        })
    }

    pub fn to_args(&self) -> Vec<String> {
        vec![
            format!("{}{}", SERVICE_FLAG, self.address),
            format!("{}{}", TOKEN_FLAG, self.token),
            format!("{}{}", LOCK_FLAG, self.lock_path.display()),
        ]
    }
}

/// Connect to the caller and serve its requests until it disconnects.
pub fn run(args: &WorkerArgs) -> Result<()> {
    info!("Starting installer service");
    let mut stream = Stream::connect(&args.address).map_err(|e| {
        InstallerError::ipc(format!("failed to connect to {}: {}", args.address, e))
    })?;

    write_message(
        &mut stream,
        &Hello {
            token: args.token.clone(),
        },
    )
    .map_err(InstallerError::ipc)?;

    let _lock = SystemMutex::acquire(&args.lock_path)?;
    serve(stream, &LocalInstaller::new())
}

/// Serve requests on a connected stream with the given installer.
pub fn serve<I: PackageInstaller>(stream: Stream, installer: &I) -> Result<()> {
    let reader = MessageReader::new(stream.try_clone()?);
    let (requests, reader) = spawn_reader::<Request, _>(reader);
    let (responses, writer) = spawn_writer::<Response>(stream);

    let result = handle_requests(installer, &requests, &responses);

    drop(responses);
    drop(requests);
    match writer.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!("Installer service writer stopped: {}", e),
        Err(_) => error!("Installer service writer panicked"),
    }
    let _ = reader.join();

    debug!("Installer service finished");
    result
}

/// Apply requests in receipt order, answering each with one response.
pub fn handle_requests<I: PackageInstaller>(
    installer: &I,
    requests: &Receiver<Result<Request>>,
    responses: &Sender<Response>,
) -> Result<()> {
    for request in requests {
        let result = match request? {
            Request::InstallPackage {
                package_path,
                destination,
                options,
            } => installer.install_package(&package_path, &destination, &options),
            Request::StoreModules {
                destination,
                modules,
            } => installer.store_modules(&destination, &modules),
        };

        if let Err(e) = &result {
            error!("Request failed: {}", e);
        }
        if responses.send(Response::from_result(&result)).is_err() {
            break;
        }
    }
    Ok(())
}

/// Run the worker to completion, returning the process exit code.
pub fn run_worker(args: &WorkerArgs) -> i32 {
    ignore_interrupts();
    match run(args) {
        Ok(()) => 0,
        Err(e) => {
            error!("Installer service failed: {}", e);
            1
        }
    }
}
