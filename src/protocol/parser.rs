//! Line Protocol Parser
//!
//! Clients send one command per line. A line is split into whitespace-separated
//! tokens; the first token is the command name, matched case-insensitively.
//!
//! ## How the Parser Works
//!
//! Parsing happens in two steps:
//!
//! 1. [`LineParser::next_line`] frames the byte stream. It returns
//!    - `Ok(Some(line))` - a complete line was split off the buffer
//!    - `Ok(None)` - need more data, no newline yet
//!    - `Err(ParseError)` - the pending line is too long; the caller disconnects
//! 2. [`parse_command`] turns one line into a [`Command`]. It returns `Ok(None)`
//!    for blank lines, which get no reply at all.
//!
//! Keeping framing separate from tokenizing means a bad line (invalid UTF-8)
//! can be answered with an error while the stream stays usable.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Errors that can occur while parsing client input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// A line exceeded the maximum allowed size without a newline
    #[error("line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },

    /// The line is not valid UTF-8
    #[error("invalid UTF-8 in command line")]
    InvalidUtf8,
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size of a single command line (512 KB)
pub const MAX_LINE_SIZE: usize = 512 * 1024;

/// A parsed command: an uppercased name plus its raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    /// Builds a command from already-split tokens.
    ///
    /// # Example
    /// ```
    /// use slotkv::protocol::Command;
    /// let cmd = Command::new("get", ["key"]);
    /// assert_eq!(cmd.name, "GET");
    /// ```
    pub fn new<I, S>(name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_uppercase(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Frames a byte stream into newline-terminated lines.
#[derive(Debug, Clone)]
pub struct LineParser {
    max_line_size: usize,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    /// Creates a parser with the default line limit.
    pub fn new() -> Self {
        Self {
            max_line_size: MAX_LINE_SIZE,
        }
    }

    /// Creates a parser with a custom line limit.
    pub fn with_max_line_size(max_line_size: usize) -> Self {
        Self { max_line_size }
    }

    /// Splits the next complete line off the front of `buf`.
    ///
    /// The returned line excludes the `\n`. Bytes after the newline stay in
    /// the buffer for the next call.
    pub fn next_line(&self, buf: &mut BytesMut) -> ParseResult<Option<Bytes>> {
        match buf.iter().position(|&b| b == b'\n') {
            Some(pos) if pos > self.max_line_size => Err(ParseError::LineTooLong {
                size: pos,
                max: self.max_line_size,
            }),
            Some(pos) => {
                let mut line = buf.split_to(pos + 1);
                line.truncate(pos);
                Ok(Some(line.freeze()))
            }
            None if buf.len() > self.max_line_size => Err(ParseError::LineTooLong {
                size: buf.len(),
                max: self.max_line_size,
            }),
            None => Ok(None),
        }
    }
}

/// Tokenizes a single line into a [`Command`].
///
/// Surrounding whitespace (including a trailing `\r`) is ignored and runs of
/// whitespace separate tokens. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &[u8]) -> ParseResult<Option<Command>> {
    let text = std::str::from_utf8(line).map_err(|_| ParseError::InvalidUtf8)?;
    let mut tokens = text.split_whitespace();

    Ok(tokens.next().map(|name| Command::new(name, tokens)))
}
