//! Command Encoding
//!
//! Commands travel as a multi-bulk request: an array header followed by one
//! length-prefixed bulk string per argument. Argument 0 is the command name.
//!
//! ```text
//! *<N>\r\n
//! $<len(arg_0)>\r\n<arg_0>\r\n
//! ...
//! $<len(arg_N-1)>\r\n<arg_N-1>\r\n
//! ```
//!
//! Integers are sent as their decimal string; the length prefix is always
//! the byte length of the argument. Encoding is pure: the same command always
//! produces identical bytes.

use crate::protocol::types::{prefix, CRLF};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// Conversion of a value into a single command argument.
pub trait Arg {
    /// Returns the argument's wire bytes (without length prefix).
    fn to_arg(&self) -> Bytes;
}

impl Arg for str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl Arg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl Arg for [u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl Arg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl Arg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

impl<T: Arg + ?Sized> Arg for &T {
    fn to_arg(&self) -> Bytes {
        (**self).to_arg()
    }
}

macro_rules! integer_arg {
    ($($ty:ty),*) => {
        $(
            impl Arg for $ty {
                fn to_arg(&self) -> Bytes {
                    Bytes::from(self.to_string())
                }
            }
        )*
    };
}

integer_arg!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// An ordered list of arguments, the first being the command name.
///
/// A command can only be built from a name, so it is never empty.
///
/// # Example
///
/// ```
/// use redka::protocol::Command;
///
/// let cmd = Command::new("set").arg("k").arg("v");
/// assert_eq!(&cmd.encode()[..], b"*3\r\n$3\r\nset\r\n$1\r\nk\r\n$1\r\nv\r\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    args: Vec<Bytes>,
}

impl Command {
    /// Starts a command with the given name.
    pub fn new(name: impl Arg) -> Self {
        Self {
            args: vec![name.to_arg()],
        }
    }

    /// Builds a command from a name and a list of arguments.
    pub fn with_args<I, A>(name: impl Arg, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Arg,
    {
        let mut cmd = Self::new(name);
        cmd.args.extend(args.into_iter().map(|a| a.to_arg()));
        cmd
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Arg) -> Self {
        self.args.push(arg.to_arg());
        self
    }

    /// The command name (argument 0).
    pub fn name(&self) -> &[u8] {
        &self.args[0]
    }

    /// All arguments, including the name.
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// Number of wire elements, including the name.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Always false: a command has at least its name.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Exact number of bytes `encode` will produce.
    pub fn encoded_len(&self) -> usize {
        let header = 1 + decimal_len(self.args.len()) + CRLF.len();
        self.args.iter().fold(header, |acc, arg| {
            acc + 1 + decimal_len(arg.len()) + CRLF.len() + arg.len() + CRLF.len()
        })
    }

    /// Encodes the command into its multi-bulk wire form.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }

    /// Encodes the command into an existing buffer.
    pub fn encode_into(&self, buf: &mut BytesMut) {
        buf.reserve(self.encoded_len());
        buf.put_u8(prefix::ARRAY);
        buf.put_slice(self.args.len().to_string().as_bytes());
        buf.put_slice(CRLF);
        for arg in &self.args {
            buf.put_u8(prefix::BULK_STRING);
            buf.put_slice(arg.len().to_string().as_bytes());
            buf.put_slice(CRLF);
            buf.put_slice(arg);
            buf.put_slice(CRLF);
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", String::from_utf8_lossy(arg))?;
        }
        Ok(())
    }
}

fn decimal_len(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_set() {
        let cmd = Command::new("set").arg("k").arg("v");
        assert_eq!(
            &cmd.encode()[..],
            b"*3\r\n$3\r\nset\r\n$1\r\nk\r\n$1\r\nv\r\n"
        );
    }

    #[test]
    fn test_encode_name_only() {
        let cmd = Command::new("flushdb");
        assert_eq!(&cmd.encode()[..], b"*1\r\n$7\r\nflushdb\r\n");
    }

    #[test]
    fn test_integers_are_stringified() {
        let cmd = Command::new("lrange").arg("list").arg(0).arg(-1i64);
        assert_eq!(
            &cmd.encode()[..],
            b"*4\r\n$6\r\nlrange\r\n$4\r\nlist\r\n$1\r\n0\r\n$2\r\n-1\r\n"
        );
    }

    #[test]
    fn test_length_is_byte_length() {
        // "привет" is 6 chars but 12 bytes
        let cmd = Command::new("set").arg("k").arg("привет");
        let encoded = cmd.encode();
        assert!(encoded.windows(5).any(|w| w == b"$12\r\n"));
    }

    #[test]
    fn test_binary_and_crlf_arguments() {
        let cmd = Command::new("set").arg("k").arg(&b"a\r\nb\x00"[..]);
        assert_eq!(
            &cmd.encode()[..],
            b"*3\r\n$3\r\nset\r\n$1\r\nk\r\n$5\r\na\r\nb\x00\r\n"
        );
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let cmd = Command::with_args("hset", ["h", "f", "v"]);
        assert_eq!(cmd.encode(), cmd.encode());
        assert_eq!(cmd.encode(), cmd.clone().encode());
    }

    #[test]
    fn test_encoded_len_matches() {
        let cmd = Command::with_args("config", ["SET", "maxmemory", "1234567890"]);
        assert_eq!(cmd.encoded_len(), cmd.encode().len());
        assert_eq!(decimal_len(0), 1);
        assert_eq!(decimal_len(10), 2);
    }

    #[test]
    fn test_display() {
        let cmd = Command::new("setex").arg("k").arg(10).arg("v");
        assert_eq!(cmd.to_string(), "setex k 10 v");
        assert_eq!(cmd.name(), b"setex");
        assert_eq!(cmd.len(), 4);
    }
}
