//! Storefront error types.

use thiserror::Error;

/// Catalog loading and editing errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Store already exists: {0}")]
    StoreExists(String),

    #[error("Store not found: {0}")]
    StoreNotFound(String),

    #[error("Category already exists in {store}: {category}")]
    CategoryExists { store: String, category: String },

    #[error("Category not found in {store}: {category}")]
    CategoryNotFound { store: String, category: String },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Store keys must be non-empty with no whitespace; names must be non-blank.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors building an order at checkout.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Unknown store: {0}")]
    UnknownStore(String),

    /// A bulk list with no non-blank lines.
    #[error("Add at least one item to the bulk list")]
    NoBulkItems,
}

/// Result type alias using CheckoutError.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
