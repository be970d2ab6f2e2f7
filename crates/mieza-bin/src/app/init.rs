//! Relay construction and the long-running relay loop.

use std::sync::Arc;

use mieza_config::{Config, Paths};
use mieza_kv_store::SqliteKvStore;
use order_outbox::{
    BackoffPolicy, BestEffortTransport, ClientContext, DetachedBeacon, DisabledBeacon,
    DrainWorker, OrderRelay, OrderTransport, RelayConfig, WebhookSender,
};
use tokio::signal;
use tracing::{error, info, warn};

/// Map configuration onto relay tuning.
pub(crate) fn relay_config(config: &Config) -> RelayConfig {
    RelayConfig {
        fast_path_timeout: config.fast_path_timeout(),
        drain_timeout: config.drain_timeout(),
        max_retries: config.max_retries,
        backoff: BackoffPolicy {
            base: config.backoff_base(),
            max: config.backoff_max(),
        },
        keep_dropped: config.keep_dropped,
        client_context: ClientContext::new(&config.user_agent, &config.client_url),
    }
}

/// Open the durable queue and wire the webhook transports.
pub(crate) fn build_relay(config: &Config, paths: &Paths) -> anyhow::Result<OrderRelay> {
    paths.ensure_dirs()?;

    let store = Arc::new(SqliteKvStore::open(&paths.store_file())?);
    let endpoint = config.endpoint_url()?;
    let sender: Arc<dyn OrderTransport> = Arc::new(WebhookSender::new(endpoint.as_str())?);

    let beacon: Arc<dyn BestEffortTransport> = if config.best_effort_enabled {
        Arc::new(DetachedBeacon::new(sender.clone(), config.fast_path_timeout()))
    } else {
        Arc::new(DisabledBeacon)
    };

    Ok(OrderRelay::builder(store, sender)
        .config(relay_config(config))
        .beacon(beacon)
        .build())
}

/// Run the relay until Ctrl-C.
pub async fn run_relay(config: Config, paths: Paths) -> anyhow::Result<()> {
    info!("Starting Mieza relay");
    info!(
        endpoint = %config.endpoint_url,
        drain_interval_secs = config.drain_interval_secs,
        max_retries = config.max_retries,
        store = %paths.store_file().display(),
        "Configuration loaded"
    );

    let relay = build_relay(&config, &paths)?;
    match relay.pending_count().await {
        Ok(count) => info!(pending = count, "Queue opened"),
        Err(e) => warn!(error = %e, "Could not read queue at startup"),
    }

    let worker = DrainWorker::start(relay.clone(), config.drain_interval());

    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
    }
    info!("Received Ctrl+C, shutting down");

    worker.stop().await;
    info!("Relay stopped");
    Ok(())
}
