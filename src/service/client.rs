//! Caller side of the privileged execution gateway.

use std::io;
use std::path::Path;
use std::process::Child;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::elevate::spawn_elevated;
use super::protocol::{spawn_reader, spawn_writer, Hello, MessageReader, Request, Response};
use super::transport::{ServiceListener, Stream};
use super::worker::WorkerArgs;
use crate::error::{InstallerError, Result};
use crate::package::PackageInstaller;
use crate::release::{InstallOptions, ModuleRelease};

const ACCEPT_POLL: Duration = Duration::from_millis(100);

struct Channel {
    requests: Sender<Request>,
    responses: Receiver<Result<Response>>,
}

/// Proxies package operations to an elevated worker process.
///
/// Requests are strictly paired with responses: at most one is outstanding.
pub struct ServiceInstaller {
    channel: Mutex<Option<Channel>>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<io::Result<()>>>,
    child: Option<Child>,
}

impl ServiceInstaller {
    /// Wrap an already connected worker stream.
    pub fn from_stream(stream: Stream) -> Result<Self> {
        let reader = MessageReader::new(stream.try_clone()?);
        Ok(Self::start(reader, stream, None))
    }

    fn start(reader: MessageReader<Stream>, stream: Stream, child: Option<Child>) -> Self {
        let (responses, reader) = spawn_reader::<Response, _>(reader);
        let (requests, writer) = spawn_writer::<Request>(stream);

        Self {
            channel: Mutex::new(Some(Channel {
                requests,
                responses,
            })),
            reader: Some(reader),
            writer: Some(writer),
            child,
        }
    }

    /// Launch an elevated copy of this executable and wait for it to connect.
    pub fn launch(elevation_command: &str, lock_path: &Path) -> Result<Self> {
        let listener = ServiceListener::bind()
            .map_err(|e| InstallerError::ipc(format!("failed to create endpoint: {}", e)))?;
        let args = WorkerArgs {
            address: listener.address().to_string(),
            token: uuid::Uuid::new_v4().to_string(),
            lock_path: lock_path.to_path_buf(),
        };

        let exe = std::env::current_exe()?;
        info!("Starting elevated installer service");
        let mut child = spawn_elevated(&exe, &args.to_args(), elevation_command)?;

        let stream = match accept_worker(&listener, &mut child) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        let mut reader = MessageReader::new(stream.try_clone()?);
        if let Err(e) = verify_hello(&mut reader, &args.token) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(e);
        }
        debug!("Installer service connected");

        Ok(Self::start(reader, stream, Some(child)))
    }

    fn request(&self, request: Request) -> Result<()> {
        let guard = self.channel.lock().unwrap_or_else(|e| e.into_inner());
        let channel = guard
            .as_ref()
            .ok_or_else(|| InstallerError::ipc("installer service is closed"))?;

        channel
            .requests
            .send(request)
            .map_err(|_| InstallerError::ipc("connection closed before the request was sent"))?;

        match channel.responses.recv() {
            Ok(Ok(Response { error: None })) => Ok(()),
            Ok(Ok(Response {
                error: Some(message),
            })) => Err(anyhow::anyhow!(message).into()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(InstallerError::ipc(
                "connection closed before a response arrived",
            )),
        }
    }
}

fn verify_hello(reader: &mut MessageReader<Stream>, token: &str) -> Result<()> {
    match reader.read_message::<Hello>()? {
        Some(hello) if hello.token == token => Ok(()),
        Some(_) => Err(InstallerError::Elevation {
            message: "installer service presented an unexpected token".to_string(),
        }),
        None => Err(InstallerError::Elevation {
            message: "installer service disconnected before identifying itself".to_string(),
        }),
    }
}

fn accept_worker(listener: &ServiceListener, child: &mut Child) -> Result<Stream> {
    listener.set_nonblocking(true)?;

    loop {
        match listener.accept() {
            Ok(stream) => return Ok(stream),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            Err(e) => return Err(InstallerError::ipc(e)),
        }

        if let Some(status) = child.try_wait()? {
            return Err(InstallerError::Elevation {
                message: format!("elevated worker exited ({}) before connecting", status),
            });
        }
        thread::sleep(ACCEPT_POLL);
    }
}

impl PackageInstaller for ServiceInstaller {
    fn install_package(
        &self,
        artifact: &Path,
        destination: &Path,
        options: &InstallOptions,
    ) -> Result<()> {
        self.request(Request::InstallPackage {
            package_path: artifact.to_path_buf(),
            destination: destination.to_path_buf(),
            options: options.clone(),
        })
    }

    fn store_modules(&self, destination: &Path, modules: &[ModuleRelease]) -> Result<()> {
        self.request(Request::StoreModules {
            destination: destination.to_path_buf(),
            modules: modules.to_vec(),
        })
    }

    /// Close the connection and wait for the worker to exit.
    fn close(&mut self) -> Result<()> {
        // Dropping the request queue shuts down our write half, which the
        // worker sees as end-of-stream.
        let channel = self
            .channel
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        drop(channel);

        if let Some(writer) = self.writer.take() {
            match writer.join() {
                Ok(Err(e)) => warn!("Installer service writer failed: {}", e),
                Err(_) => warn!("Installer service writer panicked"),
                Ok(Ok(())) => {}
            }
        }
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        if let Some(mut child) = self.child.take() {
            let status = child.wait()?;
            if !status.success() {
                warn!("Installer service exited with {}", status);
            }
        }
        Ok(())
    }
}

impl Drop for ServiceInstaller {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to shut down installer service: {}", e);
        }
    }
}
