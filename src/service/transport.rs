//! Local byte-stream transport between the caller and the elevated worker.
//!
//! Addresses are `unix:<socket path>` or `tcp:<host:port>`.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};

#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};

const UNIX_SCHEME: &str = "unix:";
const TCP_SCHEME: &str = "tcp:";

/// A connected duplex stream.
#[derive(Debug)]
pub enum Stream {
    #[cfg(unix)]
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl Stream {
    /// Connect to a listener address.
    pub fn connect(address: &str) -> io::Result<Self> {
        if let Some(addr) = address.strip_prefix(TCP_SCHEME) {
            return TcpStream::connect(addr).map(Stream::Tcp);
        }

        #[cfg(unix)]
        if let Some(path) = address.strip_prefix(UNIX_SCHEME) {
            return UnixStream::connect(path).map(Stream::Unix);
        }

        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported service address '{}'", address),
        ))
    }

    /// A connected pair of streams within this process.
    pub fn pair() -> io::Result<(Self, Self)> {
        #[cfg(unix)]
        {
            let (a, b) = UnixStream::pair()?;
            Ok((Stream::Unix(a), Stream::Unix(b)))
        }

        #[cfg(not(unix))]
        {
            let listener = TcpListener::bind("127.0.0.1:0")?;
            let a = TcpStream::connect(listener.local_addr()?)?;
            let (b, _) = listener.accept()?;
            Ok((Stream::Tcp(a), Stream::Tcp(b)))
        }
    }

    pub fn try_clone(&self) -> io::Result<Self> {
        match self {
            #[cfg(unix)]
            Stream::Unix(s) => s.try_clone().map(Stream::Unix),
            Stream::Tcp(s) => s.try_clone().map(Stream::Tcp),
        }
    }

    /// Signal end-of-stream to the peer while still allowing reads.
    pub fn shutdown_write(&self) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Stream::Unix(s) => s.shutdown(Shutdown::Write),
            Stream::Tcp(s) => s.shutdown(Shutdown::Write),
        }
    }

    fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Stream::Unix(s) => s.set_nonblocking(nonblocking),
            Stream::Tcp(s) => s.set_nonblocking(nonblocking),
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Stream::Unix(s) => s.read(buf),
            Stream::Tcp(s) => s.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            #[cfg(unix)]
            Stream::Unix(s) => s.write(buf),
            Stream::Tcp(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            #[cfg(unix)]
            Stream::Unix(s) => s.flush(),
            Stream::Tcp(s) => s.flush(),
        }
    }
}

enum Listener {
    #[cfg(unix)]
    Unix(UnixListener),
    Tcp(TcpListener),
}

/// A private endpoint created for a single worker.
pub struct ServiceListener {
    listener: Listener,
    address: String,
    // Keeps the socket directory alive for the listener's lifetime.
    _dir: Option<tempfile::TempDir>,
}

impl ServiceListener {
    /// Bind a fresh endpoint: a socket in a private temporary directory on
    /// Unix, an ephemeral loopback port elsewhere.
    pub fn bind() -> io::Result<Self> {
        #[cfg(unix)]
        {
            let dir = tempfile::Builder::new()
                .prefix("unity-installer-")
                .tempdir()?;
            let path = dir.path().join("service.sock");
            let listener = UnixListener::bind(&path)?;
            Ok(Self {
                listener: Listener::Unix(listener),
                address: format!("{}{}", UNIX_SCHEME, path.display()),
                _dir: Some(dir),
            })
        }

        #[cfg(not(unix))]
        {
            Self::bind_loopback()
        }
    }

    /// Bind an ephemeral TCP port on the loopback interface.
    pub fn bind_loopback() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let address = format!("{}{}", TCP_SCHEME, listener.local_addr()?);
        Ok(Self {
            listener: Listener::Tcp(listener),
            address,
            _dir: None,
        })
    }

    /// Address the worker should connect to.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        match &self.listener {
            #[cfg(unix)]
            Listener::Unix(l) => l.set_nonblocking(nonblocking),
            Listener::Tcp(l) => l.set_nonblocking(nonblocking),
        }
    }

    /// Accept one connection. The returned stream is always blocking.
    pub fn accept(&self) -> io::Result<Stream> {
        let stream = match &self.listener {
            #[cfg(unix)]
            Listener::Unix(l) => l.accept().map(|(s, _)| Stream::Unix(s))?,
            Listener::Tcp(l) => l.accept().map(|(s, _)| Stream::Tcp(s))?,
        };
        stream.set_nonblocking(false)?;
        Ok(stream)
    }
}
