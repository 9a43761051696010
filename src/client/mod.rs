//! Client Module
//!
//! Ties encoding, transmission and decoding together.
//!
//! ## Execution
//!
//! ```text
//! execute(command)
//!       │
//!       ├── no transport? ── connect (no retry; failure is final)
//!       │
//!       ▼
//! ┌─────────────┐  fails   ┌──────────────────────┐  fails
//! │   write     │─────────>│ reconnect + write    │────────> CommandFailed
//! └──────┬──────┘          └──────────┬───────────┘
//!        │ ok                         │ ok
//!        ▼                            ▼
//! ┌─────────────┐  nothing readable   ┌──────────────────────┐  fails
//! │ read reply  │────────────────────>│ reconnect + re-read  │────> ReplyUnavailable
//! └──────┬──────┘                     │ (command NOT resent) │
//!        │                            └──────────────────────┘
//!        ▼
//!   Reply | Server error | protocol fault
//! ```
//!
//! Each call tries at most twice in total. There is no backoff and no
//! further retry.
//!
//! ## Ownership
//!
//! The client owns at most one transport. Reconnecting builds a new one
//! through the [`Connector`] and drops the old one, closing its socket.
//! A transport that failed, or that was left in the middle of a reply, is
//! dropped and never reused; the next call connects afresh.
//!
//! One command is in flight at a time. Replies are matched to requests by
//! order alone, so a client must not be shared between threads without
//! serializing access to it.

pub mod abort;
pub mod commands;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::messages::{Locale, MessageTable};
use crate::protocol::{Command, DecodeError, DecodeResult, Reply, ReplyDecoder};
use crate::transport::{Connector, Endpoint, TcpConnector, Transport};
use std::fmt;
use std::io;
use tracing::{debug, trace, warn};

pub use abort::AbortHandler;
pub use commands::ListEnd;

/// Whether the client currently holds a live transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// A blocking client for one server.
pub struct Client<C: Connector = TcpConnector> {
    endpoint: Endpoint,
    connector: C,
    transport: Option<C::Transport>,
    decoder: ReplyDecoder,
    locale: Locale,
    messages: MessageTable,
    abort_handler: Option<AbortHandler>,
}

impl Client<TcpConnector> {
    /// Creates a TCP client. No connection is made until the first command
    /// or an explicit [`connect`](Client::connect).
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl Default for Client<TcpConnector> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<C: Connector> Client<C> {
    /// Creates a client that opens its transports through `connector`.
    ///
    /// With `config.debug` set, the process-terminating handler
    /// [`abort::terminate`] is installed.
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        let abort_handler: Option<AbortHandler> = if config.debug {
            Some(Box::new(abort::terminate))
        } else {
            None
        };

        Self {
            endpoint: config.endpoint(),
            connector,
            transport: None,
            decoder: ReplyDecoder::new(),
            locale: config.locale,
            messages: MessageTable::default(),
            abort_handler,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        if self.transport.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    /// The table used to render messages handed to the abort handler.
    pub fn messages_mut(&mut self) -> &mut MessageTable {
        &mut self.messages
    }

    pub fn set_messages(&mut self, messages: MessageTable) {
        self.messages = messages;
    }

    /// Installs a handler that sees every failure before it is returned.
    pub fn set_abort_handler<F>(&mut self, handler: F)
    where
        F: Fn(&Error, &str) + Send + 'static,
    {
        self.abort_handler = Some(Box::new(handler));
    }

    pub fn clear_abort_handler(&mut self) {
        self.abort_handler = None;
    }

    pub fn has_abort_handler(&self) -> bool {
        self.abort_handler.is_some()
    }

    /// Renders an error in the client's locale.
    pub fn render(&self, err: &Error) -> String {
        self.messages.render(err, self.locale)
    }

    /// Opens a new connection, replacing the current one if any.
    pub fn connect(&mut self) -> Result<&mut Self> {
        self.reconnect().map_err(|e| self.fail(e))?;
        Ok(self)
    }

    /// Sends `command` and returns its decoded reply.
    ///
    /// If the write fails, the client reconnects and writes once more. If
    /// nothing can be read back, the client reconnects and reads once more
    /// *without* resending the command. A server that received the first
    /// copy may therefore answer on a connection that is gone, and the
    /// re-read on the new connection may wait for a reply that never comes.
    /// Callers that need exactly-once semantics must not rely on the read
    /// retry.
    ///
    /// Only a failure on the first line of the reply is retried. Once part
    /// of a reply has been read, for example the header of an array, a
    /// failure on any later line or payload is returned as
    /// [`Error::Io`] and the connection is dropped without a re-read.
    pub fn execute(&mut self, command: &Command) -> Result<Reply> {
        self.execute_once(command).map_err(|e| self.fail(e))
    }

    /// Builds and executes a command from a name and arguments.
    pub fn send<A, I>(&mut self, name: &str, args: I) -> Result<Reply>
    where
        I: IntoIterator<Item = A>,
        A: crate::protocol::Arg,
    {
        self.execute(&Command::with_args(name, args))
    }

    fn execute_once(&mut self, command: &Command) -> Result<Reply> {
        if self.transport.is_none() {
            self.reconnect()?;
        }

        let request = command.encode();

        if let Err(e) = self.write(&request) {
            warn!(command = %command, error = %e, "Write failed, reconnecting to resend");
            self.reconnect()?;
            if let Err(source) = self.write(&request) {
                self.disconnect();
                return Err(Error::CommandFailed {
                    command: command.to_string(),
                    source,
                });
            }
        }

        let result = match self.read_reply() {
            Err(DecodeError::Unreadable(e)) => {
                warn!(command = %command, error = %e, "Read failed, reconnecting to read again");
                self.reconnect()?;
                match self.read_reply() {
                    Err(DecodeError::Unreadable(source)) => {
                        self.disconnect();
                        return Err(Error::ReplyUnavailable {
                            command: command.to_string(),
                            source,
                        });
                    }
                    other => other,
                }
            }
            other => other,
        };

        match result {
            Ok(reply) => {
                trace!(command = %command, "Reply decoded");
                Ok(reply)
            }
            Err(e) => {
                // A top-level error reply leaves the stream clean; anything
                // else may leave unread bytes behind.
                if !matches!(e, DecodeError::Server(_)) || self.decoder.is_mid_reply() {
                    self.disconnect();
                }
                Err(e.into())
            }
        }
    }

    fn reconnect(&mut self) -> Result<()> {
        self.disconnect();
        let transport = self.connector.connect(&self.endpoint)?;
        debug!(server = %self.endpoint, "Transport opened");
        self.transport = Some(transport);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.transport.take().is_some() {
            debug!(server = %self.endpoint, "Transport dropped");
        }
    }

    fn write(&mut self, request: &[u8]) -> io::Result<()> {
        let transport = self.transport.as_mut().ok_or_else(not_connected)?;
        let written = transport.write(request)?;
        if written == 0 && !request.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "transport accepted no bytes",
            ));
        }
        Ok(())
    }

    fn read_reply(&mut self) -> DecodeResult<Reply> {
        match self.transport.as_mut() {
            Some(transport) => self.decoder.decode(transport),
            None => Err(DecodeError::Unreadable(not_connected())),
        }
    }

    /// Passes a failure through the abort handler, if one is installed.
    fn fail(&self, err: Error) -> Error {
        if let Some(handler) = &self.abort_handler {
            let message = self.messages.render(&err, self.locale);
            handler(&err, &message);
        }
        err
    }
}

impl<C: Connector> fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .field("locale", &self.locale)
            .field("abort_handler", &self.abort_handler.is_some())
            .finish()
    }
}

fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "no open transport")
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedConnector, ScriptedTransport};
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::{Arc, Mutex};

    fn client(connector: &ScriptedConnector) -> Client<ScriptedConnector> {
        Client::with_connector(ClientConfig::default(), connector.clone())
    }

    #[test]
    fn test_connects_lazily() {
        let connector = ScriptedConnector::new(vec![ScriptedTransport::replying(b"+PONG\r\n")]);
        let mut client = client(&connector);
        assert_eq!(client.state(), ConnectionState::Disconnected);

        let reply = client.execute(&Command::new("ping")).unwrap();
        assert_eq!(reply, Reply::status("PONG"));
        assert!(client.is_connected());
        assert_eq!(connector.connects(), 1);
        assert_eq!(connector.writes(0), vec![b"*1\r\n$4\r\nping\r\n".to_vec()]);
    }

    #[test]
    fn test_write_failure_reconnects_and_resends() {
        let connector = ScriptedConnector::new(vec![
            ScriptedTransport::failing_writes(),
            ScriptedTransport::replying(b":1\r\n"),
        ]);
        let mut client = client(&connector);

        let reply = client.execute(&Command::new("incr").arg("n")).unwrap();
        assert_eq!(reply, Reply::Integer(1));
        assert_eq!(connector.connects(), 2);
        assert_eq!(connector.live(), 1);
        assert_eq!(connector.writes(1).len(), 1);
    }

    #[test]
    fn test_two_write_failures_fail_without_reading() {
        let connector = ScriptedConnector::new(vec![
            ScriptedTransport::failing_writes(),
            ScriptedTransport::failing_writes(),
        ]);
        let mut client = client(&connector);

        let err = client.execute(&Command::new("get").arg("k")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommandFailed);
        assert_eq!(connector.reads(), 0);
        assert_eq!(connector.connects(), 2);
        assert_eq!(connector.live(), 0);
        assert!(!client.is_connected());
    }

    #[test]
    fn test_read_failure_reconnects_and_rereads_without_resending() {
        let connector = ScriptedConnector::new(vec![
            ScriptedTransport::replying(b""),
            ScriptedTransport::replying(b"$1\r\nv\r\n"),
        ]);
        let mut client = client(&connector);

        let reply = client.execute(&Command::new("get").arg("k")).unwrap();
        assert_eq!(reply, Reply::bulk("v"));
        assert_eq!(connector.writes(0).len(), 1);
        assert!(connector.writes(1).is_empty());
        assert_eq!(connector.live(), 1);
    }

    #[test]
    fn test_two_read_failures_are_reply_unavailable() {
        let connector = ScriptedConnector::new(vec![
            ScriptedTransport::replying(b""),
            ScriptedTransport::replying(b""),
        ]);
        let mut client = client(&connector);

        let err = client.execute(&Command::new("get").arg("k")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ReplyUnavailable);
        assert_eq!(connector.connects(), 2);
        assert!(!client.is_connected());
    }

    #[test]
    fn test_cut_off_first_line_is_not_a_reply() {
        let connector = ScriptedConnector::new(vec![
            ScriptedTransport::replying(b":12"),
            ScriptedTransport::replying(b":1234\r\n"),
        ]);
        let mut client = client(&connector);

        let reply = client.execute(&Command::new("incr").arg("n")).unwrap();
        assert_eq!(reply, Reply::Integer(1234));
        assert!(connector.writes(1).is_empty());
    }

    #[test]
    fn test_failure_inside_array_is_not_retried() {
        let connector = ScriptedConnector::new(vec![
            ScriptedTransport::replying(b"*2\r\n:1\r\n:2"),
            ScriptedTransport::replying(b"+OK\r\n"),
        ]);
        let mut client = client(&connector);

        let err = client.execute(&Command::new("lrange")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(connector.connects(), 1);
        assert!(!client.is_connected());
    }

    #[test]
    fn test_initial_connect_failure_is_not_retried() {
        let connector = ScriptedConnector::new(vec![]);
        let mut client = client(&connector);

        let err = client.execute(&Command::new("ping")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(connector.connects(), 1);
    }

    #[test]
    fn test_reconnect_failure_surfaces_connection_error() {
        let connector = ScriptedConnector::new(vec![ScriptedTransport::failing_writes()]);
        let mut client = client(&connector);

        let err = client.execute(&Command::new("ping")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(connector.live(), 0);
    }

    #[test]
    fn test_server_error_is_not_retried_and_keeps_connection() {
        let connector = ScriptedConnector::new(vec![ScriptedTransport::replying(
            b"-ERR unknown command 'nope'\r\n+OK\r\n",
        )]);
        let mut client = client(&connector);

        let err = client.execute(&Command::new("nope")).unwrap_err();
        assert!(matches!(err, Error::Server(ref msg) if msg == "ERR unknown command 'nope'"));
        assert!(client.is_connected());

        let reply = client.execute(&Command::new("ping")).unwrap();
        assert!(reply.is_ok());
        assert_eq!(connector.connects(), 1);
    }

    #[test]
    fn test_protocol_fault_drops_transport() {
        let connector = ScriptedConnector::new(vec![
            ScriptedTransport::replying(b"?what\r\n"),
            ScriptedTransport::replying(b"+OK\r\n"),
        ]);
        let mut client = client(&connector);

        let err = client.execute(&Command::new("ping")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedReplyFormat);
        assert!(!client.is_connected());

        assert!(client.execute(&Command::new("ping")).unwrap().is_ok());
        assert_eq!(connector.connects(), 2);
    }

    #[test]
    fn test_nested_server_error_drops_transport() {
        let connector = ScriptedConnector::new(vec![ScriptedTransport::replying(
            b"*2\r\n-ERR inner\r\n:1\r\n",
        )]);
        let mut client = client(&connector);

        let err = client.execute(&Command::new("exec")).unwrap_err();
        assert!(err.is_server_error());
        assert!(!client.is_connected());
    }

    #[test]
    fn test_explicit_connect_replaces_transport() {
        let connector = ScriptedConnector::new(vec![
            ScriptedTransport::replying(b""),
            ScriptedTransport::replying(b""),
        ]);
        let mut client = client(&connector);

        client.connect().unwrap();
        client.connect().unwrap();
        assert_eq!(connector.connects(), 2);
        assert_eq!(connector.live(), 1);
    }

    #[test]
    fn test_abort_handler_sees_rendered_failure() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let connector = ScriptedConnector::new(vec![]);
        let mut client = client(&connector);

        let sink = Arc::clone(&seen);
        client.set_abort_handler(move |err, message| {
            sink.lock().unwrap().push((err.kind(), message.to_string()));
        });

        let err = client.execute(&Command::new("ping")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, ErrorKind::Connection);
        assert!(seen[0].1.starts_with("Failed to open connect to Redis: "));
    }

    #[test]
    fn test_debug_config_installs_abort_handler() {
        let connector = ScriptedConnector::new(vec![]);
        let client = Client::with_connector(ClientConfig::default().with_debug(true), connector);
        assert!(client.has_abort_handler());

        let mut client = client;
        client.clear_abort_handler();
        assert!(!client.has_abort_handler());
    }

    #[test]
    fn test_render_uses_client_locale() {
        let connector = ScriptedConnector::new(vec![]);
        let mut client = client(&connector);
        client.set_locale(Locale::Ru);
        let text = client.render(&Error::Server("ERR x".into()));
        assert_eq!(text, "Ошибка Redis: ERR x");
    }
}
