//! In-Memory Transport
//!
//! A transport backed by byte buffers instead of a socket: reads come from a
//! preloaded inbound buffer, writes are collected in an outbound buffer.
//! Useful for decoding replies captured elsewhere and for tests.

use crate::transport::Transport;
use bytes::{Buf, Bytes, BytesMut};
use std::io;

/// Transport over in-memory buffers.
///
/// # Example
///
/// ```
/// use redka::protocol::decoder::decode;
/// use redka::protocol::Reply;
/// use redka::transport::MemoryTransport;
///
/// let mut transport = MemoryTransport::new(&b":42\r\n"[..]);
/// assert_eq!(decode(&mut transport).unwrap(), Reply::Integer(42));
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    inbound: Bytes,
    consumed: usize,
    outbound: BytesMut,
}

impl MemoryTransport {
    /// Creates a transport whose reads yield `inbound`.
    pub fn new(inbound: impl Into<Bytes>) -> Self {
        Self {
            inbound: inbound.into(),
            consumed: 0,
            outbound: BytesMut::new(),
        }
    }

    /// Bytes read so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes not read yet.
    pub fn remaining(&self) -> &[u8] {
        &self.inbound
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.outbound
    }

    /// Appends more inbound bytes.
    pub fn feed(&mut self, data: &[u8]) {
        let mut buf = BytesMut::with_capacity(self.inbound.len() + data.len());
        buf.extend_from_slice(&self.inbound);
        buf.extend_from_slice(data);
        self.inbound = buf.freeze();
    }

    fn take(&mut self, n: usize) -> Bytes {
        self.consumed += n;
        self.inbound.split_to(n)
    }
}

impl Transport for MemoryTransport {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }
        self.outbound.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        if !self.inbound.has_remaining() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of buffered input",
            ));
        }
        match self.inbound.iter().position(|&b| b == b'\n') {
            Some(pos) => Ok(self.take(pos + 1).to_vec()),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("unterminated line of {} bytes", self.inbound.len()),
            )),
        }
    }

    fn read_exact(&mut self, n: usize) -> io::Result<Bytes> {
        if self.inbound.len() < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("wanted {} bytes, {} buffered", n, self.inbound.len()),
            ));
        }
        Ok(self.take(n))
    }
}
