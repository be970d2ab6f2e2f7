//! Storefront domain: catalog browsing and editing, the cart, and checkout
//! for supermarket, parcel-pickup and retailer bulk orders.
//!
//! Checkout produces an [`OrderRecord`]; its [`OrderRecord::to_payload`] is
//! what gets submitted to the order relay.

mod cart;
mod catalog;
mod checkout;
mod editor;
mod error;

pub use cart::{format_ghs, Cart, CartLine};
pub use catalog::{Catalog, CategoryFilter, Product};
pub use checkout::{
    build_bulk_order, build_pickup_order, build_supermarket_order, bulk_whatsapp_link,
    bulk_whatsapp_text, cart_from_items, parse_bulk_items, BulkForm, BulkItem, CheckoutForm,
    OrderRecord, ORDER_TYPE_BULK, ORDER_TYPE_PICKUP, ORDER_TYPE_SUPERMARKET,
};
pub use editor::NEW_PRODUCT_NAME;
pub use error::{CatalogError, CatalogResult, CheckoutError, CheckoutResult};
