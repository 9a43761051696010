//! TCP Transport
//!
//! Blocking transport over `std::net::TcpStream`. Reads go through a
//! `BufReader` so that line reads do not cost one syscall per byte; writes
//! go straight to the socket.

use crate::error::{Error, Result};
use crate::transport::{Connector, Endpoint, Transport};
use bytes::{Bytes, BytesMut};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use tracing::{debug, trace};

/// Initial read buffer capacity
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// A live TCP connection to the server.
#[derive(Debug)]
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
}

impl TcpTransport {
    /// Connects to `endpoint`.
    pub fn open(endpoint: &Endpoint) -> Result<Self> {
        let stream = TcpStream::connect((endpoint.host(), endpoint.port())).map_err(|source| {
            Error::Connection {
                host: endpoint.host().to_string(),
                port: endpoint.port(),
                source,
            }
        })?;

        // Commands are written in one piece; don't let Nagle hold them back.
        stream.set_nodelay(true).map_err(|source| Error::Connection {
            host: endpoint.host().to_string(),
            port: endpoint.port(),
            source,
        })?;

        debug!(server = %endpoint, "Connected");

        Ok(Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, stream),
        })
    }

    /// The underlying socket.
    pub fn stream(&self) -> &TcpStream {
        self.reader.get_ref()
    }
}

impl Transport for TcpTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let stream = self.reader.get_mut();
        stream.write_all(bytes)?;
        stream.flush()?;
        trace!(bytes = bytes.len(), "Wrote command");
        Ok(bytes.len())
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        self.reader.read_until(b'\n', &mut line)?;
        if line.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            ));
        }
        if !line.ends_with(b"\n") {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("connection closed mid-line after {} bytes", line.len()),
            ));
        }
        Ok(line)
    }

    fn read_exact(&mut self, n: usize) -> io::Result<Bytes> {
        let mut buf = BytesMut::zeroed(n);
        self.reader.read_exact(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Opens [`TcpTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Transport = TcpTransport;

    fn connect(&self, endpoint: &Endpoint) -> Result<TcpTransport> {
        TcpTransport::open(endpoint)
    }
}
