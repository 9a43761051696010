//! Error types for Redka
//!
//! Every failure the client can report, one variant per kind. Errors carry
//! data, not user-facing text: localized messages are produced from
//! [`Error::kind`] by [`MessageTable`](crate::messages::MessageTable).

use crate::protocol::DecodeError;
use std::io;
use thiserror::Error;

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for client operations.
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    /// The transport could not be established.
    #[error("failed to connect to {host}:{port} - ({}) {source}", errno(.source))]
    Connection {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// The command could not be written, before and after a reconnect.
    #[error("failed to send command `{command}`: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: io::Error,
    },

    /// No reply could be read, before and after a reconnect.
    #[error("unable to read reply for command `{command}`: {source}")]
    ReplyUnavailable {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The transport failed part-way through a reply.
    #[error("I/O error while reading reply: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// The server returned an error reply. Carries its message verbatim.
    #[error("{0}")]
    Server(String),

    /// A reply line began with an unrecognized prefix, or was empty.
    #[error("non-protocol answer: {0:?}")]
    UnexpectedReplyFormat(String),

    /// A reply carried a malformed length, count or integer.
    #[error("protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Caller-level Errors
    // -------------------------------------------------------------------------
    /// An existence check before a read found nothing.
    #[error("key not found: {0}")]
    KeyNotFound(String),
}

/// The kind of an [`Error`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    CommandFailed,
    ReplyUnavailable,
    Io,
    Server,
    UnexpectedReplyFormat,
    Protocol,
    KeyNotFound,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Connection,
        ErrorKind::CommandFailed,
        ErrorKind::ReplyUnavailable,
        ErrorKind::Io,
        ErrorKind::Server,
        ErrorKind::UnexpectedReplyFormat,
        ErrorKind::Protocol,
        ErrorKind::KeyNotFound,
    ];
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection { .. } => ErrorKind::Connection,
            Error::CommandFailed { .. } => ErrorKind::CommandFailed,
            Error::ReplyUnavailable { .. } => ErrorKind::ReplyUnavailable,
            Error::Io(_) => ErrorKind::Io,
            Error::Server(_) => ErrorKind::Server,
            Error::UnexpectedReplyFormat(_) => ErrorKind::UnexpectedReplyFormat,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::KeyNotFound(_) => ErrorKind::KeyNotFound,
        }
    }

    /// The OS error code behind a connection failure, if any.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Error::Connection { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// Returns true for errors reported by the server itself.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server(_))
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Unreadable(e) | DecodeError::Io(e) => Error::Io(e),
            DecodeError::Server(msg) => Error::Server(msg),
            DecodeError::UnexpectedFormat(line) => Error::UnexpectedReplyFormat(line),
            DecodeError::Protocol(msg) => Error::Protocol(msg),
        }
    }
}

fn errno(err: &io::Error) -> i32 {
    err.raw_os_error().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::Server("ERR".into()).kind(), ErrorKind::Server);
        assert_eq!(
            Error::KeyNotFound("k".into()).kind(),
            ErrorKind::KeyNotFound
        );
        assert_eq!(
            Error::from(DecodeError::UnexpectedFormat("?".into())).kind(),
            ErrorKind::UnexpectedReplyFormat
        );
    }

    #[test]
    fn test_connection_error_carries_errno() {
        let err = Error::Connection {
            host: "127.0.0.1".into(),
            port: 6379,
            source: io::Error::from_raw_os_error(111),
        };
        assert_eq!(err.errno(), Some(111));
        let text = err.to_string();
        assert!(text.starts_with("failed to connect to 127.0.0.1:6379 - (111)"));
    }

    #[test]
    fn test_server_message_is_verbatim() {
        let err = Error::Server("WRONGTYPE Operation against a key".into());
        assert_eq!(err.to_string(), "WRONGTYPE Operation against a key");
        assert!(err.is_server_error());
    }
}
