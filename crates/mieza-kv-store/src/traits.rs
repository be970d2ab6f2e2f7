//! Storage trait definitions.

use crate::StoreResult;

/// A durable string-to-string map.
pub trait KeyValueStore: Send + Sync {
    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Retrieve a value.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Delete a value. Returns whether a value was present.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Check if a key exists.
    fn has(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
