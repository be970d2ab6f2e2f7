//! Serialized queue state in the key-value substrate.

use crate::{DroppedEnvelope, Envelope, OutboxResult};
use mieza_kv_store::KeyValueStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::warn;

/// Key holding the pending queue as a JSON array of envelopes.
pub const QUEUE_KEY: &str = "mieza_send_queue_v1";

/// Key holding envelopes dropped after exhausting their retry budget.
pub const DROPPED_KEY: &str = "mieza_dropped_v1";

/// Maximum dropped envelopes retained; oldest are evicted first.
pub const MAX_DROPPED_RETAINED: usize = 500;

/// Whole-value access to the pending queue and dead-letter list.
///
/// Every write replaces the stored value. A missing or malformed value
/// reads as an empty list; storage errors propagate.
#[derive(Clone)]
pub struct PersistedQueue {
    store: Arc<dyn KeyValueStore>,
}

impl PersistedQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> OutboxResult<Vec<Envelope>> {
        self.load_list(QUEUE_KEY)
    }

    pub fn save(&self, queue: &[Envelope]) -> OutboxResult<()> {
        let json = serde_json::to_string(queue)?;
        self.store.set(QUEUE_KEY, &json)?;
        Ok(())
    }

    pub fn load_dropped(&self) -> OutboxResult<Vec<DroppedEnvelope>> {
        self.load_list(DROPPED_KEY)
    }

    /// Append to the dead-letter list, evicting the oldest past the cap.
    pub fn append_dropped(&self, dropped: Vec<DroppedEnvelope>) -> OutboxResult<()> {
        if dropped.is_empty() {
            return Ok(());
        }

        let mut all = self.load_dropped()?;
        all.extend(dropped);
        if all.len() > MAX_DROPPED_RETAINED {
            let excess = all.len() - MAX_DROPPED_RETAINED;
            all.drain(..excess);
        }

        let json = serde_json::to_string(&all)?;
        self.store.set(DROPPED_KEY, &json)?;
        Ok(())
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> OutboxResult<Vec<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored value is malformed, treating as empty");
                Ok(Vec::new())
            }
        }
    }
}
