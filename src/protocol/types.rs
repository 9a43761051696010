//! RESP Reply Types
//!
//! This module defines the values a server can send back for a command.
//! Every reply starts with a single prefix byte that selects its shape, so
//! a reply is always interpretable without look-ahead:
//!
//! - `+` Status
//! - `-` Error (surfaced as a failure, never as a value)
//! - `:` Integer
//! - `$` Bulk String
//! - `*` Array
//!
//! All lines are terminated with CRLF (`\r\n`).
//!
//! ## Examples
//!
//! Status: `+OK\r\n`
//! Integer: `:1000\r\n`
//! Bulk String: `$5\r\nhello\r\n`
//! Nil Bulk String: `$-1\r\n`
//! Array: `*2\r\n:1\r\n:2\r\n`
//! Nil Array: `*-1\r\n`

use bytes::Bytes;
use std::fmt;

/// The CRLF terminator used in RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type prefixes
pub mod prefix {
    pub const STATUS: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const ARRAY: u8 = b'*';
}

/// A decoded server reply.
///
/// Error replies are not represented here: the decoder turns them into
/// [`Error::Server`](crate::Error::Server) so they reach the caller as a
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Simple status line, e.g. `OK` or `PONG`.
    /// Format: `+<string>\r\n`
    Status(String),

    /// 64-bit signed integer.
    /// Format: `:<integer>\r\n`
    Integer(i64),

    /// Binary-safe bulk string. `None` is the nil reply (`$-1\r\n`).
    /// Format: `$<length>\r\n<data>\r\n`
    Bulk(Option<Bytes>),

    /// Array of replies, possibly nested. `None` is the nil array
    /// (`*-1\r\n`).
    /// Format: `*<count>\r\n<element1><element2>...`
    Array(Option<Vec<Reply>>),
}

impl Reply {
    /// Creates a status reply.
    ///
    /// # Example
    /// ```
    /// use redka::protocol::types::Reply;
    /// let ok = Reply::status("OK");
    /// assert!(ok.is_ok());
    /// ```
    pub fn status(s: impl Into<String>) -> Self {
        Reply::Status(s.into())
    }

    /// Creates a bulk string reply.
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Reply::Bulk(Some(data.into()))
    }

    /// The nil bulk string.
    pub fn nil() -> Self {
        Reply::Bulk(None)
    }

    /// Creates an array reply.
    pub fn array(values: Vec<Reply>) -> Self {
        Reply::Array(Some(values))
    }

    /// The nil array.
    pub fn nil_array() -> Self {
        Reply::Array(None)
    }

    /// Returns true for `+OK`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Status(s) if s == "OK")
    }

    /// Returns true for the nil bulk string and the nil array.
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Bulk(None) | Reply::Array(None))
    }

    /// Loose truthiness, used where a command's answer is read as a yes/no.
    ///
    /// Non-zero integers, non-empty arrays, non-empty statuses and bulk
    /// strings other than `"0"` are true. Nil is false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Reply::Status(s) => !s.is_empty(),
            Reply::Integer(n) => *n != 0,
            Reply::Bulk(Some(data)) => !data.is_empty() && data.as_ref() != b"0",
            Reply::Bulk(None) => false,
            Reply::Array(Some(values)) => !values.is_empty(),
            Reply::Array(None) => false,
        }
    }

    /// Attempts to extract the inner string from a status or a UTF-8 bulk string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Reply::Status(s) => Some(s),
            Reply::Bulk(Some(b)) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Attempts to extract the inner bytes from a bulk string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Reply::Bulk(Some(b)) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Reply::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract the inner array.
    pub fn as_array(&self) -> Option<&[Reply]> {
        match self {
            Reply::Array(Some(arr)) => Some(arr),
            _ => None,
        }
    }

    /// Consumes self and returns the inner array if this is a non-nil array.
    pub fn into_array(self) -> Option<Vec<Reply>> {
        match self {
            Reply::Array(arr) => arr,
            _ => None,
        }
    }

    /// Serializes the reply to its wire format.
    ///
    /// Clients never send replies; this exists so fake servers and
    /// benchmarks can produce byte-exact server output.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Status(s) => {
                buf.push(prefix::STATUS);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Integer(n) => {
                buf.push(prefix::INTEGER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            Reply::Bulk(Some(data)) => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            Reply::Bulk(None) => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(b"-1");
                buf.extend_from_slice(CRLF);
            }
            Reply::Array(Some(values)) => {
                buf.push(prefix::ARRAY);
                buf.extend_from_slice(values.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.serialize_into(buf);
                }
            }
            Reply::Array(None) => {
                buf.push(prefix::ARRAY);
                buf.extend_from_slice(b"-1");
                buf.extend_from_slice(CRLF);
            }
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(s) => write!(f, "{}", s),
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Bulk(Some(data)) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "(binary data, {} bytes)", data.len())
                }
            }
            Reply::Bulk(None) | Reply::Array(None) => write!(f, "(nil)"),
            Reply::Array(Some(values)) => {
                if values.is_empty() {
                    write!(f, "(empty array)")
                } else {
                    for (i, v) in values.iter().enumerate() {
                        if i > 0 {
                            writeln!(f)?;
                        }
                        write!(f, "{}) {}", i + 1, v)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialize() {
        assert_eq!(Reply::status("OK").serialize(), b"+OK\r\n");
    }

    #[test]
    fn test_nil_serialize() {
        assert_eq!(Reply::nil().serialize(), b"$-1\r\n");
        assert_eq!(Reply::nil_array().serialize(), b"*-1\r\n");
    }

    #[test]
    fn test_nested_array_serialize() {
        let value = Reply::array(vec![
            Reply::Integer(1),
            Reply::array(vec![Reply::Integer(2), Reply::bulk("x")]),
        ]);
        assert_eq!(value.serialize(), b"*2\r\n:1\r\n*2\r\n:2\r\n$1\r\nx\r\n");
    }

    #[test]
    fn test_truthiness() {
        assert!(Reply::Integer(1).is_truthy());
        assert!(!Reply::Integer(0).is_truthy());
        assert!(Reply::status("OK").is_truthy());
        assert!(!Reply::bulk("0").is_truthy());
        assert!(!Reply::bulk("").is_truthy());
        assert!(Reply::bulk("v").is_truthy());
        assert!(!Reply::nil().is_truthy());
        assert!(!Reply::array(vec![]).is_truthy());
        assert!(!Reply::nil_array().is_truthy());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Reply::bulk("hello").as_str(), Some("hello"));
        assert_eq!(Reply::Integer(7).as_integer(), Some(7));
        assert_eq!(Reply::nil_array().into_array(), None);
        assert!(Reply::nil().is_nil());
        assert!(!Reply::bulk("").is_nil());
    }

    #[test]
    fn test_display() {
        assert_eq!(Reply::Integer(3).to_string(), "(integer) 3");
        assert_eq!(Reply::nil().to_string(), "(nil)");
        assert_eq!(
            Reply::array(vec![Reply::bulk("a"), Reply::bulk("b")]).to_string(),
            "1) \"a\"\n2) \"b\""
        );
    }
}
