//! Line Protocol Implementation
//!
//! This module implements the text protocol spoken by the server.
//!
//! ## Overview
//!
//! Requests are UTF-8 lines: one command per line, tokens separated by runs of
//! whitespace, terminated by `\n`. Replies are plain text in a small grammar
//! (`OK`, `"string"`, `(integer) n`, `(nil)`, `(error) ERR message`).
//!
//! ## Modules
//!
//! - `types`: Defines the `Reply` enum and its wire rendering
//! - `parser`: Line framing and command tokenizing
//!
//! ## Example
//!
//! ```
//! use slotkv::protocol::{parse_command, LineParser, Reply};
//! use bytes::BytesMut;
//!
//! // Parsing incoming data
//! let mut buf = BytesMut::from(&b"GET name\n"[..]);
//! let line = LineParser::new().next_line(&mut buf).unwrap().unwrap();
//! let command = parse_command(&line).unwrap().unwrap();
//! assert_eq!(command.args, vec!["name"]);
//!
//! // Creating responses
//! let bytes = Reply::string("Ariz").serialize();
//! assert_eq!(bytes, b"\"Ariz\"\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_command, Command, LineParser, ParseError, ParseResult};
pub use types::Reply;
