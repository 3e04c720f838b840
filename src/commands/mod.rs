//! Command Handler Module
//!
//! This module implements the command processing layer. It receives parsed
//! commands, executes them against the session's selected database, and
//! returns the reply to send back.
//!
//! ## Architecture
//!
//! ```text
//! Client Line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  DatabaseSet    │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `SET`, `GET`, `DEL`, `INCR`, `EXISTS`
//! - `SELECT`, `COMPACT`, `DBSIZE`, `FLUSHDB`
//! - `PING`, `ECHO`

pub mod handler;

// Re-export the main command handler
pub use handler::{CommandError, CommandHandler};
