//! # Redka - A Lightweight Blocking Redis Client
//!
//! Redka speaks the RESP protocol to a Redis-compatible server over a single
//! TCP connection. It sends a command name with string arguments and returns
//! a typed reply: status, integer, bulk string, nil, or a nested array.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               Client                                    │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │  Command    │───>│  Command    │───>│  Transport  │──── TCP ───>     │
//! │  │  Catalogue  │    │  Encoder    │    │  write()    │                  │
//! │  └─────────────┘    └─────────────┘    └─────────────┘                  │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │   Reply     │<───│   Reply     │<───│  Transport  │<─── TCP ────     │
//! │  │  (typed)    │    │  Decoder    │    │  read_*()   │                  │
//! │  └─────────────┘    └─────────────┘    └─────────────┘                  │
//! │                                                                         │
//! │        Retry policy: one reconnect per failed write or read             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use redka::{Client, ClientConfig, Reply};
//!
//! fn main() -> redka::Result<()> {
//!     let mut client = Client::new(ClientConfig::new("127.0.0.1", 6379));
//!
//!     client.set("name", "Ariz", None)?;
//!     assert_eq!(client.get("name")?, Reply::bulk("Ariz"));
//!
//!     // Any command, by name
//!     let reply = client.send("lrange", ["list", "0", "-1"])?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: Command encoding, reply types and the reply decoder
//! - [`transport`]: Blocking byte-stream connections (TCP and in-memory)
//! - [`client`]: Execution, retry policy and the command catalogue
//! - [`error`]: Error taxonomy
//! - [`messages`]: Localized error messages
//! - [`config`]: Client configuration
//!
//! ## Design Highlights
//!
//! ### Stack-Safe Decoding
//!
//! The decoder keeps an explicit stack of open arrays rather than
//! recursing, and rejects replies nested deeper than
//! [`protocol::MAX_DEPTH`], so corrupt input cannot overflow the native
//! stack.
//!
//! ### Replace, Don't Repair
//!
//! A reconnect always builds a fresh transport and drops the old one. A
//! connection that failed, or that stopped in the middle of a reply, is
//! never used again.
//!
//! ### Errors Are Kinds
//!
//! The client reports typed errors. Human-readable, localized text comes
//! from a separate [`MessageTable`]. In debug mode an abort handler turns
//! any failure into process termination; otherwise failures are returned.

pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod protocol;
pub mod transport;

// Re-export commonly used types for convenience
pub use client::{Client, ConnectionState, ListEnd};
pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};
pub use messages::{Locale, MessageTable};
pub use protocol::{Command, Reply};
pub use transport::{Connector, Endpoint, TcpConnector, Transport};

/// The default port Redis listens on
pub const DEFAULT_PORT: u16 = 6379;

/// The default host the client connects to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of Redka
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
