//! A single key-value namespace.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌──────────────────────────────┐
//! │           Database           │
//! │  ┌────────────────────────┐  │
//! │  │ RwLock                 │  │
//! │  │ HashMap<String,String> │  │
//! │  └────────────────────────┘  │
//! └──────────────────────────────┘
//! ```
//!
//! Every operation takes the lock exactly once, so each one is atomic with
//! respect to every other operation on the same database. Readers share the
//! lock; any writer excludes all readers and writers. Two different databases
//! never contend with each other.

use crate::storage::StorageError;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// An isolated in-memory mapping from string keys to string values.
///
/// Values are always stored as strings; [`increment`](Database::increment)
/// interprets them as base-10 integers only at the moment of use.
///
/// # Example
///
/// ```
/// use slotkv::storage::Database;
///
/// let db = Database::new();
/// db.set("name".to_string(), "Ariz".to_string());
/// assert_eq!(db.get("name"), Some("Ariz".to_string()));
///
/// assert_eq!(db.increment("visits"), Ok(1));
/// assert_eq!(db.get("visits"), Some("1".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct Database {
    data: RwLock<HashMap<String, String>>,
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-written: every
    // mutation is a single HashMap call. Keep serving from the poisoned lock.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the value stored at `key`, or `None` if it is absent.
    pub fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).cloned()
    }

    /// Inserts or overwrites `key`.
    pub fn set(&self, key: String, value: String) {
        self.write().insert(key, value);
    }

    /// Removes `key`.
    ///
    /// # Returns
    ///
    /// Returns `true` if the key existed before the call.
    pub fn delete(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    /// Increments the integer stored at `key` by one and returns the new value.
    ///
    /// An absent key is initialised to `1`. If the stored value is not a
    /// base-10 integer, or the increment would overflow, the value is left
    /// untouched and an error is returned.
    pub fn increment(&self, key: &str) -> Result<i64, StorageError> {
        let mut data = self.write();

        let next = match data.get(key) {
            Some(current) => current
                .parse::<i64>()
                .map_err(|_| StorageError::NotAnInteger)?
                .checked_add(1)
                .ok_or(StorageError::Overflow)?,
            None => 1,
        };

        data.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    /// Copies the whole keyspace under a single read lock.
    ///
    /// The order of the returned pairs is unspecified.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Checks if a key exists.
    pub fn exists(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the database holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key.
    pub fn clear(&self) {
        self.write().clear();
    }
}
