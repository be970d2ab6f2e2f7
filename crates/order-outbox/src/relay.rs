//! The durable order queue.

use crate::{
    BackoffPolicy, BestEffortTransport, ClientContext, Clock, DisabledBeacon, DroppedEnvelope,
    Envelope, OrderTransport, OutboxError, OutboxResult, PersistedQueue, SystemClock,
};
use mieza_kv_store::KeyValueStore;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info, warn};

/// Relay tuning.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Timeout for the immediate send issued by `submit`.
    pub fast_path_timeout: Duration,
    /// Timeout for each send issued by `drain`.
    pub drain_timeout: Duration,
    /// Failed attempts tolerated; the attempt that exceeds this drops the envelope.
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
    /// Keep dropped envelopes in the dead-letter list.
    pub keep_dropped: bool,
    /// Stamped on every envelope.
    pub client_context: ClientContext,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            fast_path_timeout: Duration::from_secs(8),
            drain_timeout: Duration::from_secs(12),
            max_retries: 6,
            backoff: BackoffPolicy::default(),
            keep_dropped: true,
            client_context: ClientContext::new(
                concat!("mieza/", env!("CARGO_PKG_VERSION")),
                "cli://mieza",
            ),
        }
    }
}

/// Returned by `submit` once the envelope is persisted.
///
/// "Accepted for delivery", not "delivered".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAck {
    pub accepted: bool,
    pub durably_queued: bool,
    pub best_effort_sent: bool,
    pub envelope_id: String,
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    /// Envelopes attempted this pass.
    pub eligible: usize,
    pub delivered: usize,
    /// Failed attempts left in the queue for a later pass.
    pub failed: usize,
    /// Ids removed for exceeding the retry budget.
    pub dropped: Vec<String>,
    /// Envelopes still inside their backoff window.
    pub skipped_backoff: usize,
    /// Whether the pass wrote to storage.
    pub persisted: bool,
    /// The pass was skipped because another drain was in flight.
    pub reentrant: bool,
}

/// Handle to the durable order queue. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct OrderRelay {
    inner: Arc<RelayInner>,
}

struct RelayInner {
    config: RelayConfig,
    /// Every read-modify-write of persisted state happens under this lock,
    /// and the lock is never held across network I/O.
    queue: Mutex<PersistedQueue>,
    transport: Arc<dyn OrderTransport>,
    beacon: Arc<dyn BestEffortTransport>,
    clock: Arc<dyn Clock>,
    draining: AtomicBool,
    fast_paths_in_flight: AtomicUsize,
    fast_paths_settled: Notify,
}

/// Builder for [`OrderRelay`].
pub struct OrderRelayBuilder {
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn OrderTransport>,
    config: RelayConfig,
    beacon: Arc<dyn BestEffortTransport>,
    clock: Arc<dyn Clock>,
}

impl OrderRelayBuilder {
    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn beacon(mut self, beacon: Arc<dyn BestEffortTransport>) -> Self {
        self.beacon = beacon;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> OrderRelay {
        OrderRelay {
            inner: Arc::new(RelayInner {
                config: self.config,
                queue: Mutex::new(PersistedQueue::new(self.store)),
                transport: self.transport,
                beacon: self.beacon,
                clock: self.clock,
                draining: AtomicBool::new(false),
                fast_paths_in_flight: AtomicUsize::new(0),
                fast_paths_settled: Notify::new(),
            }),
        }
    }
}

impl OrderRelay {
    /// Start building a relay over `store`, delivering through `transport`.
    ///
    /// Defaults: [`RelayConfig::default`], no beacon, wall-clock time.
    pub fn builder(
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn OrderTransport>,
    ) -> OrderRelayBuilder {
        OrderRelayBuilder {
            store,
            transport,
            config: RelayConfig::default(),
            beacon: Arc::new(DisabledBeacon),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Accept an order for delivery.
    ///
    /// Persists the envelope before returning, then races an immediate send
    /// in the background. Network outcomes never surface here; storage
    /// failures do.
    pub async fn submit(&self, order: Value) -> OutboxResult<SubmitAck> {
        let inner = &self.inner;
        let envelope = Envelope::new(order, inner.config.client_context.clone(), inner.clock.now())?;

        let best_effort_sent = inner.beacon.send(&envelope);

        {
            let queue = inner.queue.lock().await;
            let mut pending = queue.load()?;
            pending.push(envelope.clone());
            queue.save(&pending)?;
        }

        info!(
            envelope_id = %envelope.id,
            best_effort_sent,
            "Order queued"
        );

        let envelope_id = envelope.id.clone();
        self.spawn_fast_path(envelope);

        Ok(SubmitAck {
            accepted: true,
            durably_queued: true,
            best_effort_sent,
            envelope_id,
        })
    }

    fn spawn_fast_path(&self, envelope: Envelope) {
        let guard = FastPathGuard::new(self.inner.clone());
        tokio::spawn(async move {
            let inner = &guard.inner;
            match inner
                .transport
                .send(&envelope, inner.config.fast_path_timeout)
                .await
            {
                Ok(()) => match inner.remove(&envelope.id).await {
                    Ok(true) => info!(envelope_id = %envelope.id, "Immediate send succeeded"),
                    Ok(false) => debug!(envelope_id = %envelope.id, "Immediate send succeeded after envelope left the queue"),
                    Err(e) => error!(envelope_id = %envelope.id, error = %e, "Failed to remove delivered envelope"),
                },
                Err(e) => {
                    info!(envelope_id = %envelope.id, error = %e, "Immediate send failed, leaving for drain")
                }
            }
        });
    }

    /// Wait until every in-flight immediate send has resolved.
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub async fn settle(&self, timeout: Duration) -> bool {
        let inner = &self.inner;
        let wait = async {
            loop {
                let notified = inner.fast_paths_settled.notified();
                if inner.fast_paths_in_flight.load(Ordering::SeqCst) == 0 {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    /// Retry every pending envelope whose backoff window has passed.
    ///
    /// Transmission failures are absorbed into the envelope's attempt count;
    /// only storage failures are returned. A call made while another drain is
    /// in flight returns immediately with `reentrant` set.
    pub async fn drain(&self) -> OutboxResult<DrainReport> {
        let inner = &self.inner;
        let Some(_guard) = DrainGuard::acquire(&inner.draining) else {
            debug!("Drain already in flight, skipping");
            return Ok(DrainReport {
                reentrant: true,
                ..Default::default()
            });
        };

        let now = inner.clock.now();
        let mut report = DrainReport::default();

        let batch = {
            let queue = inner.queue.lock().await;
            let mut pending = queue.load()?;
            if pending.is_empty() {
                return Ok(report);
            }

            let mut batch = Vec::new();
            for envelope in pending.iter_mut() {
                if inner.config.backoff.is_due(envelope, now) {
                    envelope.last_attempt_at = Some(now);
                    batch.push(envelope.clone());
                } else {
                    report.skipped_backoff += 1;
                }
            }

            if batch.is_empty() {
                debug!(pending = pending.len(), "No envelope due yet");
                return Ok(report);
            }

            queue.save(&pending)?;
            report.persisted = true;
            batch
        };
        report.eligible = batch.len();

        let mut outcomes = Vec::with_capacity(batch.len());
        for envelope in &batch {
            let result = inner
                .transport
                .send(envelope, inner.config.drain_timeout)
                .await;
            match &result {
                Ok(()) => {
                    report.delivered += 1;
                    info!(envelope_id = %envelope.id, attempts = envelope.attempts, "Queued order sent");
                }
                Err(e) => warn!(
                    envelope_id = %envelope.id,
                    attempts = envelope.attempts + 1,
                    error = %e,
                    "Send failed, will retry"
                ),
            }
            outcomes.push((envelope.id.clone(), result));
        }

        let queue = inner.queue.lock().await;
        let mut pending = queue.load()?;
        let mut changed = false;
        let mut dropped = Vec::new();

        for (id, result) in outcomes {
            // Gone means a concurrent immediate send already delivered it.
            let Some(pos) = pending.iter().position(|e| e.id == id) else {
                continue;
            };

            let last_error = match result {
                Ok(()) => {
                    pending.remove(pos);
                    changed = true;
                    continue;
                }
                Err(e) => e,
            };

            pending[pos].attempts += 1;
            changed = true;
            if pending[pos].attempts <= inner.config.max_retries {
                report.failed += 1;
                continue;
            }

            let envelope = pending.remove(pos);
            let exhausted = OutboxError::RetryBudgetExhausted {
                id: envelope.id.clone(),
                attempts: envelope.attempts,
            };
            error!(
                envelope_id = %envelope.id,
                attempts = envelope.attempts,
                error = %last_error,
                "Dropping order after max retries"
            );
            report.dropped.push(envelope.id.clone());
            dropped.push(DroppedEnvelope {
                envelope,
                dropped_at: now,
                reason: format!("{} (last error: {})", exhausted, last_error),
            });
        }

        if changed {
            queue.save(&pending)?;
            report.persisted = true;
        }
        if inner.config.keep_dropped {
            queue.append_dropped(dropped)?;
        }

        debug!(
            eligible = report.eligible,
            delivered = report.delivered,
            failed = report.failed,
            dropped = report.dropped.len(),
            remaining = pending.len(),
            "Drain pass complete"
        );
        Ok(report)
    }

    /// Snapshot of the pending queue, in insertion order.
    pub async fn pending(&self) -> OutboxResult<Vec<Envelope>> {
        self.inner.queue.lock().await.load()
    }

    pub async fn pending_count(&self) -> OutboxResult<usize> {
        Ok(self.pending().await?.len())
    }

    /// Envelopes dropped after exhausting their retry budget, oldest first.
    pub async fn dropped(&self) -> OutboxResult<Vec<DroppedEnvelope>> {
        self.inner.queue.lock().await.load_dropped()
    }
}

impl RelayInner {
    /// Remove an envelope by id. Returns whether it was still queued.
    async fn remove(&self, id: &str) -> OutboxResult<bool> {
        let queue = self.queue.lock().await;
        let mut pending = queue.load()?;
        let before = pending.len();
        pending.retain(|e| e.id != id);
        if pending.len() == before {
            return Ok(false);
        }
        queue.save(&pending)?;
        Ok(true)
    }
}

struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Tracks one immediate send; wakes `settle` waiters when the last one ends.
struct FastPathGuard {
    inner: Arc<RelayInner>,
}

impl FastPathGuard {
    fn new(inner: Arc<RelayInner>) -> Self {
        inner.fast_paths_in_flight.fetch_add(1, Ordering::SeqCst);
        Self { inner }
    }
}

impl Drop for FastPathGuard {
    fn drop(&mut self) {
        if self.inner.fast_paths_in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.fast_paths_settled.notify_waiters();
        }
    }
}
