//! # SlotKV - A Multi-Database In-Memory Key-Value Server
//!
//! SlotKV is a small key-value server in the spirit of Redis. Clients talk to
//! it over TCP with a line-oriented text protocol; the server holds a fixed
//! number of independent in-memory databases that sessions switch between
//! with `SELECT`.
//!
//! ## Features
//!
//! - **Line Protocol**: One command per line, easy to drive with `nc` or `telnet`
//! - **Database Slots**: N isolated databases created at startup (16 by default)
//! - **Concurrent Access**: Each database has its own RwLock; no global lock
//! - **Async I/O**: Built on Tokio, one task per client connection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              SlotKV                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │                  │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │                  │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘                  │
//! │                                               │                         │
//! │                                               ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐    │
//! │  │   Line      │    │               DatabaseSet                    │    │
//! │  │   Parser    │    │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │    │
//! │  │             │    │  │  DB 0  │ │  DB 1  │ │  DB 2  │ │...N-1  │ │    │
//! │  └─────────────┘    │  │RwLock  │ │RwLock  │ │RwLock  │ │        │ │    │
//! │                     │  └────────┘ └────────┘ └────────┘ └────────┘ │    │
//! │                     └──────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use slotkv::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = Server::bind(&ServerConfig::default()).await?;
//!     server.run_until(slotkv::shutdown_signal()).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `SET key value...` / `GET key` / `DEL key` / `INCR key` / `EXISTS key`
//! - `SELECT index` / `COMPACT` / `DBSIZE` / `FLUSHDB`
//! - `PING [message]` / `ECHO message`
//!
//! ## Reply Grammar
//!
//! ```text
//! OK
//! "<string>"
//! (integer) <n>
//! (nil)
//! (error) ERR <message>
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: Databases and the fixed database set
//! - [`protocol`]: Line framing, command tokenizing, reply rendering
//! - [`commands`]: The command dispatcher
//! - [`connection`]: Client session loop
//! - [`server`]: Listener, accept loop and shutdown

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use config::{CliAction, ServerConfig};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{Command, LineParser, ParseError, Reply};
pub use server::{shutdown_signal, Server, ServerError};
pub use storage::{Database, DatabaseSet, StorageError};

/// The default port SlotKV listens on
pub const DEFAULT_PORT: u16 = 9736;

/// The default host SlotKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// The default number of databases
pub const DEFAULT_DATABASES: usize = 16;

/// Version of SlotKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
