//! In-memory key-value store.

use crate::{KeyValueStore, StoreResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-local store. Counts writes so callers can assert on write traffic.
#[derive(Default)]
pub struct InMemoryKvStore {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` and successful `delete` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let removed = self.values.lock().remove(key).is_some();
        if removed {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_writes_not_reads() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.write_count(), 0);

        store.get("k").unwrap();
        store.has("k").unwrap();
        assert_eq!(store.write_count(), 0);

        store.set("k", "v").unwrap();
        store.set("k", "w").unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));

        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert_eq!(store.write_count(), 3);
    }
}
