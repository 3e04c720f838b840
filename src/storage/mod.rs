//! Storage Module
//!
//! This module provides the in-memory databases the server operates on.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DatabaseSet                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐       ┌─────────┐      │
//! │  │  DB 0   │ │  DB 1   │ │  DB 2   │  ...  │ DB N-1  │      │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │       │ RwLock  │      │
//! │  └─────────┘ └─────────┘ └─────────┘       └─────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Fixed Set**: N databases are created at startup and never resized
//! - **RwLock per Database**: Concurrent readers, exclusive writers
//! - **No Global Lock**: Databases never contend with each other
//! - **Volatile**: Nothing is persisted; contents are lost on exit

pub mod database;
pub mod error;
pub mod set;

// Re-export commonly used types
pub use database::Database;
pub use error::StorageError;
pub use set::DatabaseSet;
