//! Durable order queue with at-least-once webhook delivery.
//!
//! This crate provides:
//! - [`OrderRelay`]: the queue itself. `submit` persists an envelope and races
//!   an immediate send; `drain` retries pending envelopes with exponential backoff
//! - [`DrainWorker`]: the periodic task driving `drain`
//! - [`WebhookSender`]: reqwest transport posting envelopes to the webhook
//! - [`DetachedBeacon`]: fire-and-forget transport used alongside the durable enqueue
//!
//! ```text
//! submit ──▶ beacon (detached, no result)
//!        ──▶ persisted queue ◀── drain (every 10s, backoff per envelope)
//!        ──▶ fast path (8s timeout) ──success──▶ remove by id
//! ```

mod backoff;
mod beacon;
mod clock;
mod envelope;
mod error;
mod relay;
mod store;
mod transport;
mod worker;

pub use backoff::BackoffPolicy;
pub use beacon::{BestEffortTransport, DetachedBeacon, DisabledBeacon};
pub use clock::{Clock, ManualClock, SystemClock};
pub use envelope::{ClientContext, DroppedEnvelope, Envelope, WebhookBody};
pub use error::{OutboxError, OutboxResult};
pub use relay::{DrainReport, OrderRelay, OrderRelayBuilder, RelayConfig, SubmitAck};
pub use store::{PersistedQueue, DROPPED_KEY, MAX_DROPPED_RETAINED, QUEUE_KEY};
pub use transport::{OrderTransport, WebhookSender};
pub use worker::{DrainWorker, DrainWorkerHandle};
