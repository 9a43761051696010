//! Transport Module
//!
//! A transport owns exactly one byte-stream connection to the server and
//! exposes blocking I/O primitives. It knows nothing about RESP.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                               │
//! │                                                             │
//! │   encode ──> write() ──> read_line() / read_exact() ──> decode
//! │                  │                                          │
//! │                  ▼                                          │
//! │   ┌─────────────────────────┐     ┌──────────────────────┐  │
//! │   │  Connector::connect()   │────>│      Transport       │  │
//! │   │  (fresh per reconnect)  │     │  (TcpTransport, ...) │  │
//! │   └─────────────────────────┘     └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A reconnect never repairs a transport in place: the client asks its
//! [`Connector`] for a brand-new one and drops the old one, which releases
//! the underlying socket.
//!
//! There are no timeouts: a blocked read waits until the peer answers or
//! the connection drops.

pub mod memory;
pub mod tcp;

use crate::error::Result;
use bytes::Bytes;
use std::fmt;
use std::io;

pub use memory::MemoryTransport;
pub use tcp::{TcpConnector, TcpTransport};

/// Blocking byte I/O over one live connection.
pub trait Transport {
    /// Writes the whole buffer.
    ///
    /// Returns the number of bytes written. A failed write, or zero bytes
    /// written for a non-empty buffer, is reported as an `Err` so the caller
    /// can decide to reconnect.
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Reads up to and including the next `\n`.
    ///
    /// End of stream before the `\n` arrives, including a partial line, is
    /// an [`io::ErrorKind::UnexpectedEof`] error. A partial line is never
    /// returned as a complete one.
    fn read_line(&mut self) -> io::Result<Vec<u8>>;

    /// Reads exactly `n` bytes, blocking until they arrive.
    fn read_exact(&mut self, n: usize) -> io::Result<Bytes>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        (**self).write(bytes)
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_line()
    }

    fn read_exact(&mut self, n: usize) -> io::Result<Bytes> {
        (**self).read_exact(n)
    }
}

/// Opens fresh transports to an endpoint.
///
/// `connect` does not retry; retrying is the client's decision.
pub trait Connector {
    type Transport: Transport;

    /// Establishes a new connection, failing with
    /// [`Error::Connection`](crate::Error::Connection).
    fn connect(&self, endpoint: &Endpoint) -> Result<Self::Transport>;
}

/// Host and port of the server. Fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint. The host `localhost` is normalized to `127.0.0.1`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let host = if host == "localhost" {
            crate::DEFAULT_HOST.to_string()
        } else {
            host
        };
        Self { host, port }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(crate::DEFAULT_HOST, crate::DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
