//! Durable key/value storage for session identifiers.

use crate::result::AppResult;

/// String-valued durable storage, the moral equivalent of a browser's
/// local storage.
///
/// Writes must be durable when the call returns. The session store writes
/// here before it updates memory.
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read a value. Returns `None` if the key is not present.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> AppResult<()>;
}
