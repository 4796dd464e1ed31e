//
// mod.rs
//
// Copyright (C) 2024 jgd contributors
//
//

//! The bidirectional byte transport (§4.A): one outbound stream of frames
//! and RPC requests multiplexed with one inbound stream of control
//! messages, over a Unix domain socket, a TCP loopback connection, or (on
//! Windows) a named pipe.

pub mod addr;
pub mod tcp;

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod npipe;

use std::time::Duration;

use log::warn;

use crate::error::Error;
use crate::error::Result;
use addr::Address;

const READ_CHUNK: usize = 64 * 1024;
/// A single inbound line longer than this is dropped rather than grown
/// without bound (spec §9, open question (i) resolved: truncate and
/// discard rather than buffer unboundedly).
const MAX_LINE: usize = 8 * 1024 * 1024;

enum Backend {
    Tcp(tcp::Conn),
    #[cfg(unix)]
    Unix(unix::Conn),
    #[cfg(windows)]
    NamedPipe(npipe::Conn),
}

/// A connected (or not-yet-connected/disconnected) transport. Once a
/// send or recv fails, the transport latches to disconnected and every
/// subsequent operation becomes a silent no-op (§4.A Failure model, §7).
pub struct Transport {
    backend: Option<Backend>,
    address: String,
    /// Bytes read from the wire but not yet split into a complete line.
    read_buf: Vec<u8>,
}

impl Transport {
    /// A transport with nothing connected; every operation no-ops.
    pub fn disconnected() -> Self {
        Transport { backend: None, address: String::new(), read_buf: Vec::with_capacity(READ_CHUNK) }
    }

    pub fn connect(raw_address: &str) -> Result<Self> {
        let parsed = Address::parse(raw_address)?;
        let backend = Self::open(&parsed, raw_address)?;
        Ok(Transport {
            backend: Some(backend),
            address: raw_address.to_string(),
            read_buf: Vec::with_capacity(READ_CHUNK),
        })
    }

    /// Wrap an already-connected Unix domain socket. Used by tests and by
    /// embedders that accept an inbound connection themselves rather than
    /// dialing out via [`Transport::connect`].
    #[cfg(unix)]
    pub fn from_unix_stream(stream: std::os::unix::net::UnixStream) -> Self {
        Transport {
            backend: Some(Backend::Unix(unix::Conn::from_stream(stream))),
            address: "unix://<inherited>".to_string(),
            read_buf: Vec::with_capacity(READ_CHUNK),
        }
    }

    fn open(parsed: &Address, raw_address: &str) -> Result<Backend> {
        let map_err = |e: std::io::Error| Error::Connect { address: raw_address.to_string(), source: e };
        match parsed {
            Address::Tcp { host, port } => {
                Ok(Backend::Tcp(tcp::Conn::connect(host, *port).map_err(map_err)?))
            },
            #[cfg(unix)]
            Address::Unix { path } => Ok(Backend::Unix(unix::Conn::connect(path).map_err(map_err)?)),
            #[cfg(not(unix))]
            Address::Unix { .. } => {
                Err(Error::BadAddress("unix sockets are not supported on this platform".into()))
            },
            #[cfg(windows)]
            Address::NamedPipe { name } => {
                Ok(Backend::NamedPipe(npipe::Conn::connect(name).map_err(map_err)?))
            },
            #[cfg(not(windows))]
            Address::NamedPipe { .. } => {
                Err(Error::BadAddress("named pipes are not supported on this platform".into()))
            },
        }
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Append a single trailing `\n` and write the payload. The caller
    /// passes one NDJSON object with no trailing newline of its own.
    pub fn send(&mut self, payload: &str) -> Result<()> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };
        let mut framed = Vec::with_capacity(payload.len() + 1);
        framed.extend_from_slice(payload.as_bytes());
        framed.push(b'\n');
        let result = match backend {
            Backend::Tcp(c) => c.write_all(&framed),
            #[cfg(unix)]
            Backend::Unix(c) => c.write_all(&framed),
            #[cfg(windows)]
            Backend::NamedPipe(c) => c.write_all(&framed),
        };
        if let Err(e) = result {
            warn!("transport send failed on {}: {e}", self.address);
            self.backend = None;
            return Err(Error::Transport(e));
        }
        Ok(())
    }

    /// Non-blocking: true iff a complete buffered line is already
    /// pending, or the socket reports at least one readable byte.
    pub fn has_data(&mut self) -> bool {
        if self.read_buf.contains(&b'\n') {
            return true;
        }
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        let mut probe = [0u8; 1];
        let available = match backend {
            Backend::Tcp(c) => c.peek(&mut probe).map(|n| n > 0).unwrap_or(false),
            #[cfg(unix)]
            Backend::Unix(c) => c.peek(&mut probe).map(|n| n > 0).unwrap_or(false),
            #[cfg(windows)]
            Backend::NamedPipe(c) => c.has_data().unwrap_or(false),
        };
        available
    }

    /// Read and return the next complete line (without its trailing
    /// `\n`), blocking up to `timeout_ms`. Returns `None` on timeout or
    /// disconnect; a disconnect also latches the transport.
    pub fn recv_line(&mut self, timeout_ms: u64) -> Option<String> {
        if self.backend.is_none() {
            return None;
        }
        loop {
            if let Some(pos) = self.read_buf.iter().position(|&b| b == b'\n') {
                let mut line: Vec<u8> = self.read_buf.drain(..=pos).collect();
                line.pop(); // the '\n'
                return Some(String::from_utf8_lossy(&line).into_owned());
            }
            if self.read_buf.len() > MAX_LINE {
                warn!("inbound line on {} exceeded {MAX_LINE} bytes, discarding", self.address);
                self.read_buf.clear();
            }
            match self.read_chunk(timeout_ms) {
                Ok(0) => {
                    self.backend = None;
                    return None;
                },
                Ok(_) => continue,
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock ||
                        e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    return None;
                },
                Err(_) => {
                    self.backend = None;
                    return None;
                },
            }
        }
    }

    fn read_chunk(&mut self, timeout_ms: u64) -> std::io::Result<usize> {
        let timeout = Duration::from_millis(timeout_ms);
        let mut buf = [0u8; READ_CHUNK];
        let n = match self.backend.as_mut().expect("checked by caller") {
            Backend::Tcp(c) => {
                c.set_read_timeout(Some(timeout)).ok();
                c.read(&mut buf)?
            },
            #[cfg(unix)]
            Backend::Unix(c) => {
                c.set_read_timeout(Some(timeout)).ok();
                c.read(&mut buf)?
            },
            #[cfg(windows)]
            Backend::NamedPipe(c) => c.read_with_timeout(&mut buf, timeout)?,
        };
        self.read_buf.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    pub fn close(&mut self) {
        self.backend = None;
        self.read_buf.clear();
    }
}
