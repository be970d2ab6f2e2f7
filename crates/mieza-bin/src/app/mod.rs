//! Application wiring and command handlers.

mod catalog;
mod init;
mod orders;
mod settings;

pub use catalog::{
    edit_catalog, export_catalog, import_catalog, list_products, list_stores, CatalogEdit,
};
pub use init::run_relay;
pub use orders::{
    bulk_order, checkout, drain_once, parse_item_spec, pickup, read_bulk_items, read_order,
    show_dropped, show_status, submit_order,
};
pub use settings::{init_config, show_config};
