//! One-shot order commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use mieza_config::{Config, Paths};
use order_outbox::{OrderRelay, SubmitAck};
use serde_json::Value;
use storefront::{
    build_bulk_order, build_pickup_order, build_supermarket_order, bulk_whatsapp_link,
    cart_from_items, parse_bulk_items, BulkForm, BulkItem, Catalog, CheckoutForm,
};
use tracing::warn;

use super::init::build_relay;

/// Extra time `settle` gets beyond the immediate-send timeout.
const SETTLE_GRACE: Duration = Duration::from_secs(1);

/// Parse `<id>` or `<id>:<qty>`; quantity defaults to 1 and must be positive.
pub fn parse_item_spec(spec: &str) -> Result<(String, u32), String> {
    let (id, qty) = match spec.rsplit_once(':') {
        Some((id, qty)) => {
            let qty: u32 = qty
                .trim()
                .parse()
                .map_err(|_| format!("invalid quantity in {:?}", spec))?;
            (id, qty)
        }
        None => (spec, 1),
    };

    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing product id in {:?}", spec));
    }
    if qty == 0 {
        return Err(format!("quantity must be at least 1 in {:?}", spec));
    }
    Ok((id.to_string(), qty))
}

/// Read the order from `--json` or `--file`.
pub fn read_order(json: Option<String>, file: Option<PathBuf>) -> anyhow::Result<Value> {
    let raw = match (json, file) {
        (Some(json), _) => json,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => bail!("either --json or --file is required"),
    };
    serde_json::from_str(&raw).context("order is not valid JSON")
}

pub async fn submit_order(config: &Config, paths: &Paths, order: Value) -> anyhow::Result<()> {
    let relay = build_relay(config, paths)?;
    let ack = submit_and_settle(&relay, config, order).await?;
    println!("{}", serde_json::to_string_pretty(&ack)?);
    Ok(())
}

/// Submit, then give the immediate send a chance to finish before the process exits.
async fn submit_and_settle(
    relay: &OrderRelay,
    config: &Config,
    order: Value,
) -> anyhow::Result<SubmitAck> {
    let ack = relay.submit(order).await?;
    if !relay.settle(config.fast_path_timeout() + SETTLE_GRACE).await {
        warn!(envelope_id = %ack.envelope_id, "Immediate send still running at exit; left for drain");
    }
    Ok(ack)
}

pub async fn drain_once(config: &Config, paths: &Paths) -> anyhow::Result<()> {
    let relay = build_relay(config, paths)?;
    let report = relay.drain().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn show_status(config: &Config, paths: &Paths) -> anyhow::Result<()> {
    let relay = build_relay(config, paths)?;
    let pending = relay.pending().await?;
    let dropped = relay.dropped().await?;
    let backoff = relay.config().backoff;

    println!("Endpoint: {}", config.endpoint_url);
    println!("Pending: {}", pending.len());
    for envelope in &pending {
        let next = backoff
            .next_due(envelope)
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  created {}  attempts {}  next {}",
            envelope.id,
            envelope.timestamp.to_rfc3339(),
            envelope.attempts,
            next
        );
    }
    println!("Dropped: {}", dropped.len());
    Ok(())
}

pub async fn show_dropped(config: &Config, paths: &Paths) -> anyhow::Result<()> {
    let relay = build_relay(config, paths)?;
    let dropped = relay.dropped().await?;
    println!("{}", serde_json::to_string_pretty(&dropped)?);
    Ok(())
}

pub async fn checkout(
    config: &Config,
    paths: &Paths,
    catalog_path: &Path,
    store: &str,
    items: &[(String, u32)],
    form: CheckoutForm,
) -> anyhow::Result<()> {
    let catalog = Catalog::load(catalog_path)
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;
    let cart = cart_from_items(&catalog, store, items)?;
    let order = build_supermarket_order(&cart, &form)?;

    println!("{}", cart.summary());
    place_order(config, paths, order.to_payload()).await
}

pub async fn pickup(config: &Config, paths: &Paths, form: CheckoutForm) -> anyhow::Result<()> {
    let order = build_pickup_order(&form)?;
    place_order(config, paths, order.to_payload()).await
}

/// Read a bulk list from `--items` text or a `--file` CSV.
pub fn read_bulk_items(items: Option<String>, file: Option<PathBuf>) -> anyhow::Result<Vec<BulkItem>> {
    let text = match (items, file) {
        (Some(items), _) => items,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => bail!("either --items or --file is required"),
    };
    Ok(parse_bulk_items(&text))
}

/// Submit a retailer bulk order, or with `whatsapp` just print the quick-send link.
pub async fn bulk_order(
    config: &Config,
    paths: &Paths,
    form: BulkForm,
    items: Vec<BulkItem>,
    whatsapp: bool,
) -> anyhow::Result<()> {
    if whatsapp {
        println!("{}", bulk_whatsapp_link(&form, &items)?);
        return Ok(());
    }

    let order = build_bulk_order(&form, &items)?;
    println!("{} line(s) for {}", items.len(), order.name);
    place_order(config, paths, order.to_payload()).await
}

async fn place_order(config: &Config, paths: &Paths, payload: Value) -> anyhow::Result<()> {
    let relay = build_relay(config, paths)?;
    let ack = submit_and_settle(&relay, config, payload).await?;
    println!("Order received (reference {})", ack.envelope_id);
    Ok(())
}
