//! Exponential backoff between send attempts.

use crate::Envelope;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Backoff policy: `min(base * 2^attempts, max)`.
///
/// | Attempts | Delay (defaults) |
/// |----------|------------------|
/// | 0        | 1s               |
/// | 1        | 2s               |
/// | 2        | 4s               |
/// | 3        | 8s               |
/// | 4        | 16s              |
/// | 5        | 32s              |
/// | 6+       | 60s (capped)     |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1_000),
            max: Duration::from_millis(60_000),
        }
    }
}

impl BackoffPolicy {
    /// Delay required after an envelope's last attempt (or creation).
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let base_ms = self.base.as_millis().min(u64::MAX as u128) as u64;
        let max_ms = self.max.as_millis().min(u64::MAX as u128) as u64;
        let multiplier = 1u64.checked_shl(attempts).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(multiplier).min(max_ms))
    }

    /// Whether `envelope` has waited out its backoff window at `now`.
    pub fn is_due(&self, envelope: &Envelope, now: DateTime<Utc>) -> bool {
        let Some(due_at) = self.next_due(envelope) else {
            return false;
        };
        now >= due_at
    }

    /// Instant at which `envelope` next becomes eligible.
    pub fn next_due(&self, envelope: &Envelope) -> Option<DateTime<Utc>> {
        let delay = chrono::Duration::from_std(self.delay_for(envelope.attempts)).ok()?;
        envelope.backoff_anchor().checked_add_signed(delay)
    }
}
