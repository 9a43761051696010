//! Reply Decoder
//!
//! Reads exactly one reply from a [`Transport`] and turns it into a
//! [`Reply`]. The first byte of each line selects the branch:
//!
//! | Prefix | Meaning                               | Result                      |
//! |--------|---------------------------------------|-----------------------------|
//! | `-`    | server error, rest of line is message | `Err(DecodeError::Server)`  |
//! | `+`    | status                                | `Reply::Status`             |
//! | `:`    | signed integer                        | `Reply::Integer`            |
//! | `$`    | bulk length `L`, then `L` bytes + CRLF| `Reply::Bulk`               |
//! | `*`    | element count `C`, then `C` replies   | `Reply::Array`              |
//!
//! Anything else, including an empty line, is
//! [`DecodeError::UnexpectedFormat`].
//!
//! ## Bulk Strings
//!
//! For `L >= 0` the decoder reads exactly `L` payload bytes and then exactly
//! two more bytes, which are discarded without being checked. A bulk reply
//! therefore always consumes `L + 2` bytes after its header, whatever the
//! payload contains (embedded `\r\n` included).
//!
//! ## Arrays
//!
//! Instead of recursing once per level, the decoder keeps an explicit stack
//! of partially filled arrays. Nesting deeper than [`MAX_DEPTH`] is a
//! [`DecodeError::Protocol`] error: the returned [`Reply`] is itself a
//! recursive value, and dropping or comparing an arbitrarily deep one would
//! exhaust the native stack.

use crate::protocol::types::{prefix, Reply};
use crate::transport::Transport;
use bytes::Bytes;
use std::io;
use thiserror::Error;

/// Maximum size for a single bulk string (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Upper bound on elements reserved up front for an array, whatever its
/// declared count.
const MAX_PREALLOC: usize = 1024;

/// Maximum number of arrays open at once while decoding a reply.
pub const MAX_DEPTH: usize = 512;

/// Errors that can occur while decoding a reply.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The first line of the reply could not be read. Nothing was consumed.
    #[error("unable to read reply: {0}")]
    Unreadable(#[source] io::Error),

    /// The transport failed part-way through a reply.
    #[error("I/O error inside reply: {0}")]
    Io(#[source] io::Error),

    /// The server answered with an error reply.
    #[error("server error: {0}")]
    Server(String),

    /// A line started with an unknown prefix, or was empty.
    #[error("unexpected reply format: {0:?}")]
    UnexpectedFormat(String),

    /// A recognized line carried a malformed or out-of-range field.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// One line's worth of decoding.
enum Step {
    /// A complete value.
    Value(Reply),
    /// The header of a non-empty array; its elements follow.
    Open(usize),
}

/// An array whose elements are still being read.
struct Frame {
    expected: usize,
    items: Vec<Reply>,
}

/// Reusable reply decoder.
///
/// Keeps its work stack between calls so repeated decoding of nested
/// replies does not reallocate it.
#[derive(Default)]
pub struct ReplyDecoder {
    stack: Vec<Frame>,
}

impl ReplyDecoder {
    /// Creates a new decoder instance.
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    /// True when the last `decode` failed inside an array, leaving the rest
    /// of that array unread on the stream.
    pub fn is_mid_reply(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Decodes one complete reply from the transport.
    pub fn decode<T: Transport + ?Sized>(&mut self, transport: &mut T) -> DecodeResult<Reply> {
        self.stack.clear();
        let mut first_line = true;

        loop {
            let line = match transport.read_line() {
                Ok(line) => line,
                Err(e) if first_line => return Err(DecodeError::Unreadable(e)),
                Err(e) => return Err(DecodeError::Io(e)),
            };
            first_line = false;

            let mut value = match decode_line(&line, transport)? {
                Step::Value(value) => value,
                Step::Open(expected) => {
                    if self.stack.len() >= MAX_DEPTH {
                        return Err(DecodeError::Protocol(format!(
                            "nesting too deep (max: {})",
                            MAX_DEPTH
                        )));
                    }
                    self.stack.push(Frame {
                        expected,
                        items: Vec::with_capacity(expected.min(MAX_PREALLOC)),
                    });
                    continue;
                }
            };

            // Fold the finished value into its parents, closing every array
            // it completes on the way up.
            loop {
                let Some(mut frame) = self.stack.pop() else {
                    return Ok(value);
                };
                frame.items.push(value);
                if frame.items.len() < frame.expected {
                    self.stack.push(frame);
                    break;
                }
                value = Reply::Array(Some(frame.items));
            }
        }
    }
}

/// Decodes one reply with a fresh decoder.
pub fn decode<T: Transport + ?Sized>(transport: &mut T) -> DecodeResult<Reply> {
    ReplyDecoder::new().decode(transport)
}

/// Decodes a single line, reading a bulk payload from the transport if the
/// line announces one.
fn decode_line<T: Transport + ?Sized>(line: &[u8], transport: &mut T) -> DecodeResult<Step> {
    let line = strip_terminator(line);

    let Some((&kind, rest)) = line.split_first() else {
        return Err(DecodeError::UnexpectedFormat(String::new()));
    };

    match kind {
        prefix::ERROR => Err(DecodeError::Server(
            String::from_utf8_lossy(rest).into_owned(),
        )),
        prefix::STATUS => {
            let s = std::str::from_utf8(rest)
                .map_err(|e| DecodeError::Protocol(format!("invalid UTF-8 in status: {}", e)))?;
            Ok(Step::Value(Reply::Status(s.to_string())))
        }
        prefix::INTEGER => Ok(Step::Value(Reply::Integer(parse_integer(rest)?))),
        prefix::BULK_STRING => {
            let length = parse_integer(rest)?;

            if length == -1 {
                return Ok(Step::Value(Reply::Bulk(None)));
            }

            let length = usize::try_from(length)
                .map_err(|_| DecodeError::Protocol(format!("invalid bulk string length: {}", length)))?;

            if length > MAX_BULK_SIZE {
                return Err(DecodeError::Protocol(format!(
                    "bulk string too large: {} bytes (max: {})",
                    length, MAX_BULK_SIZE
                )));
            }

            let data = if length > 0 {
                transport.read_exact(length).map_err(DecodeError::Io)?
            } else {
                Bytes::new()
            };

            // Discard the trailing CRLF. Not validated, only consumed.
            transport.read_exact(2).map_err(DecodeError::Io)?;

            Ok(Step::Value(Reply::Bulk(Some(data))))
        }
        prefix::ARRAY => {
            let count = parse_integer(rest)?;

            if count == -1 {
                return Ok(Step::Value(Reply::Array(None)));
            }

            match usize::try_from(count) {
                Ok(0) => Ok(Step::Value(Reply::Array(Some(Vec::new())))),
                Ok(count) => Ok(Step::Open(count)),
                Err(_) => Err(DecodeError::Protocol(format!(
                    "invalid array length: {}",
                    count
                ))),
            }
        }
        _ => Err(DecodeError::UnexpectedFormat(
            String::from_utf8_lossy(line).into_owned(),
        )),
    }
}

/// Strips a trailing `\n` or `\r\n`.
#[inline]
fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_integer(field: &[u8]) -> DecodeResult<i64> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            DecodeError::Protocol(format!(
                "invalid integer: {:?}",
                String::from_utf8_lossy(field)
            ))
        })
}
