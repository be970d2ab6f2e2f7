//! Periodic driver for [`OrderRelay::drain`].

use crate::OrderRelay;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Background task that drains the relay on a fixed interval.
///
/// The first tick fires immediately, so orders left over from a previous
/// run are retried at startup.
pub struct DrainWorker;

impl DrainWorker {
    /// Spawn the worker on the current tokio runtime.
    pub fn start(relay: OrderRelay, period: Duration) -> DrainWorkerHandle {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_ms = period.as_millis() as u64, "Drain worker started");

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Drain worker stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        match relay.drain().await {
                            Ok(report) if report.eligible > 0 => debug!(
                                delivered = report.delivered,
                                failed = report.failed,
                                dropped = report.dropped.len(),
                                "Drain tick"
                            ),
                            Ok(_) => {}
                            Err(e) => error!(error = %e, "Drain pass failed"),
                        }
                    }
                }
            }
        });

        DrainWorkerHandle { shutdown_tx, task }
    }
}

/// Owner of a running [`DrainWorker`].
pub struct DrainWorkerHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl DrainWorkerHandle {
    /// Stop the worker and wait for the current pass, if any, to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            error!(error = %e, "Drain worker task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
