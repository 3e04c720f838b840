//! Storage-level errors.
//!
//! These never tear down a session; the command layer turns them into
//! `(error) ERR ...` replies.

use thiserror::Error;

/// Errors raised by [`Database`](super::Database) and
/// [`DatabaseSet`](super::DatabaseSet) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The stored value cannot be read as a base-10 `i64`.
    #[error("value is not an integer or out of range")]
    NotAnInteger,

    /// Incrementing would overflow `i64`.
    #[error("increment would overflow")]
    Overflow,

    /// A database index outside `[0, count)` was requested.
    #[error("DB index is out of range")]
    IndexOutOfRange { index: usize, count: usize },
}
