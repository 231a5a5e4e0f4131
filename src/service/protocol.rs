//! JSON-lines messages exchanged with the elevated worker.
//!
//! Every message is one JSON object followed by `\n`. The worker opens with a
//! [`Hello`], then answers each [`Request`] with exactly one [`Response`], in
//! order.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use super::transport::Stream;
use crate::error::{InstallerError, Result};
use crate::release::{InstallOptions, ModuleRelease};

const READ_SIZE: usize = 2048;

/// A mutating operation to perform with elevated privileges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    InstallPackage {
        package_path: PathBuf,
        destination: PathBuf,
        options: InstallOptions,
    },
    StoreModules {
        destination: PathBuf,
        modules: Vec<ModuleRelease>,
    },
}

/// Outcome of a single request. An absent error means success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn from_result(result: &Result<()>) -> Self {
        Self {
            error: result.as_ref().err().map(|e| e.to_string()),
        }
    }
}

/// First message from the worker, proving it was launched by this caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    pub token: String,
}

/// Splits a byte stream into newline-delimited JSON messages.
pub struct MessageReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: Read> MessageReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(2 * READ_SIZE),
        }
    }

    /// Next non-empty line, without its delimiter. `None` on end-of-stream.
    pub fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        loop {
            if let Some(idx) = self.buf.iter().position(|b| *b == b'\n') {
                let mut line: Vec<u8> = self.buf.drain(..=idx).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                return Ok(Some(line));
            }

            let len = self.buf.len();
            self.buf.resize(len + READ_SIZE, 0);
            let n = loop {
                match self.inner.read(&mut self.buf[len..]) {
                    Ok(n) => break n,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.buf.truncate(len);
                        return Err(e);
                    }
                }
            };
            self.buf.truncate(len + n);

            if n == 0 {
                if !self.buf.is_empty() {
                    warn!("Discarding {} bytes of unterminated message", self.buf.len());
                    self.buf.clear();
                }
                return Ok(None);
            }
        }
    }

    /// Next decoded message. `None` on end-of-stream.
    pub fn read_message<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        let Some(line) = self.read_line().map_err(InstallerError::ipc)? else {
            return Ok(None);
        };
        serde_json::from_slice(&line)
            .map(Some)
            .map_err(|e| InstallerError::ipc(format!("malformed message: {}", e)))
    }
}

/// Write one message and its delimiter.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> io::Result<()> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()
}

/// Decode messages on a background thread until end-of-stream or a decode error.
pub fn spawn_reader<T, R>(mut reader: MessageReader<R>) -> (Receiver<Result<T>>, JoinHandle<()>)
where
    T: DeserializeOwned + Send + 'static,
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || loop {
        match reader.read_message::<T>() {
            Ok(Some(message)) => {
                if tx.send(Ok(message)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                debug!("Installer service stream closed");
                break;
            }
            Err(e) => {
                let _ = tx.send(Err(e));
                break;
            }
        }
    });
    (rx, handle)
}

/// Encode queued messages on a background thread. Closing the queue shuts
/// down the write half of the stream.
pub fn spawn_writer<T>(mut stream: Stream) -> (Sender<T>, JoinHandle<io::Result<()>>)
where
    T: Serialize + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();
    let handle = thread::spawn(move || {
        for message in rx {
            write_message(&mut stream, &message)?;
        }
        stream.shutdown_write()
    });
    (tx, handle)
}
