//! Fire-and-forget delivery alongside the durable enqueue.
//!
//! A beacon never reports whether the envelope arrived; the persisted queue
//! remains the source of truth either way.

use crate::{Envelope, OrderTransport};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Hands an envelope to a transport with no result channel.
///
/// Returns whether the handoff itself was accepted.
pub trait BestEffortTransport: Send + Sync {
    fn send(&self, envelope: &Envelope) -> bool;
}

/// Spawns a detached task on the current tokio runtime for each envelope.
pub struct DetachedBeacon {
    transport: Arc<dyn OrderTransport>,
    timeout: Duration,
}

impl DetachedBeacon {
    pub fn new(transport: Arc<dyn OrderTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }
}

impl BestEffortTransport for DetachedBeacon {
    fn send(&self, envelope: &Envelope) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(envelope_id = %envelope.id, "No runtime for beacon, skipping");
            return false;
        };

        let transport = self.transport.clone();
        let timeout = self.timeout;
        let envelope = envelope.clone();
        handle.spawn(async move {
            if let Err(e) = transport.send(&envelope, timeout).await {
                debug!(envelope_id = %envelope.id, error = %e, "Beacon send failed");
            }
        });
        true
    }
}

/// Beacon that never sends.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledBeacon;

impl BestEffortTransport for DisabledBeacon {
    fn send(&self, _envelope: &Envelope) -> bool {
        false
    }
}
