//! RESP Protocol Implementation
//!
//! This module implements the client side of the Redis Serialization
//! Protocol (RESP): encoding requests and decoding replies.
//!
//! ## Modules
//!
//! - `types`: Defines the `Reply` enum and prefix constants
//! - `command`: Multi-bulk request encoding
//! - `decoder`: Reply decoding from a transport
//!
//! ## Example
//!
//! ```
//! use redka::protocol::{decode, Command, Reply};
//! use redka::transport::MemoryTransport;
//!
//! // Encoding a request
//! let request = Command::new("get").arg("name").encode();
//! assert_eq!(&request[..], b"*2\r\n$3\r\nget\r\n$4\r\nname\r\n");
//!
//! // Decoding a reply
//! let mut transport = MemoryTransport::new(&b"$4\r\nAriz\r\n"[..]);
//! assert_eq!(decode(&mut transport).unwrap(), Reply::bulk("Ariz"));
//! ```

pub mod command;
pub mod decoder;
pub mod types;

// Re-export commonly used types for convenience
pub use command::{Arg, Command};
pub use decoder::{decode, DecodeError, DecodeResult, ReplyDecoder, MAX_DEPTH};
pub use types::Reply;
