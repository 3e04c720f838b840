//! The fixed collection of databases a server owns.

use crate::storage::{Database, StorageError};

/// An ordered, fixed-length collection of independent [`Database`]s.
///
/// The set is built once at startup and never grows or shrinks, so it can be
/// shared behind an `Arc` without any lock of its own. Each database carries
/// its own lock.
///
/// # Example
///
/// ```
/// use slotkv::storage::DatabaseSet;
///
/// let databases = DatabaseSet::new(16);
/// databases.select(2).unwrap().set("k".to_string(), "v".to_string());
///
/// assert_eq!(databases.select(0).unwrap().get("k"), None);
/// assert!(databases.select(16).is_err());
/// ```
#[derive(Debug)]
pub struct DatabaseSet {
    databases: Box<[Database]>,
}

impl DatabaseSet {
    /// Creates `count` empty databases, indexed `0..count`.
    pub fn new(count: usize) -> Self {
        let databases = (0..count).map(|_| Database::new()).collect();
        Self { databases }
    }

    /// Returns the database at `index`.
    pub fn select(&self, index: usize) -> Result<&Database, StorageError> {
        self.databases
            .get(index)
            .ok_or(StorageError::IndexOutOfRange {
                index,
                count: self.databases.len(),
            })
    }

    /// Returns the number of databases.
    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Returns true if the set was created with zero databases.
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    /// Total number of keys across all databases.
    pub fn total_keys(&self) -> usize {
        self.databases.iter().map(Database::len).sum()
    }
}
