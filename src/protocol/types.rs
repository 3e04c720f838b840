//! Reply Types
//!
//! This module defines the replies the server sends back to clients.
//!
//! ## Reply Grammar
//!
//! Every reply is a single logical unit terminated by `\n`:
//!
//! - Status: `OK`
//! - String: `"<string>"`
//! - Integer: `(integer) <n>`
//! - Nil: `(nil)`
//! - Error: `(error) ERR <message>`
//!
//! The only multi-line reply is the statement list produced by `COMPACT`,
//! which embeds `\n` between its lines and is still written as one unit.

use std::fmt;

/// The newline terminator written after every reply
pub const NEWLINE: u8 = b'\n';

/// A reply to a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Bare status text such as `OK` or `PONG`.
    Status(String),

    /// A string value, rendered between double quotes.
    Str(String),

    /// An integer, rendered as `(integer) <n>`.
    Integer(i64),

    /// The absent-value sentinel `(nil)`.
    Nil,

    /// An error. The message carries its own `ERR` prefix.
    /// Format: `(error) <message>`
    Error(String),

    /// Unquoted lines joined by `\n`, used by `COMPACT`.
    Lines(Vec<String>),
}

impl Reply {
    /// Creates a status reply.
    ///
    /// # Example
    /// ```
    /// use slotkv::protocol::types::Reply;
    /// assert_eq!(Reply::status("PONG").to_string(), "PONG");
    /// ```
    pub fn status(s: impl Into<String>) -> Self {
        Reply::Status(s.into())
    }

    /// Creates a quoted string reply.
    pub fn string(s: impl Into<String>) -> Self {
        Reply::Str(s.into())
    }

    /// Creates an error reply.
    ///
    /// # Example
    /// ```
    /// use slotkv::protocol::types::Reply;
    /// let err = Reply::error("ERR unknown command 'FOO'");
    /// assert_eq!(err.to_string(), "(error) ERR unknown command 'FOO'");
    /// ```
    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    /// Creates an integer reply.
    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    /// Creates a nil reply.
    pub fn nil() -> Self {
        Reply::Nil
    }

    /// Common response for successful operations
    pub fn ok() -> Self {
        Reply::Status("OK".to_string())
    }

    /// Common response for PING
    pub fn pong() -> Self {
        Reply::Status("PONG".to_string())
    }

    /// Serializes the reply for the wire, including the trailing newline.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = self.to_string().into_bytes();
        buf.push(NEWLINE);
        buf
    }

    /// Returns true if this value is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// Returns true if this value is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(s) => write!(f, "{}", s),
            Reply::Str(s) => write!(f, "\"{}\"", s),
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Nil => write!(f, "(nil)"),
            Reply::Error(s) => write!(f, "(error) {}", s),
            Reply::Lines(lines) => write!(f, "{}", lines.join("\n")),
        }
    }
}
