//! Errors from loading configuration and resolving paths.

use thiserror::Error;

/// Why `Config` or `Paths` could not be produced.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A setting failed validation (zero interval, inverted backoff bounds, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `endpoint_url` did not parse.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// `config.json` is not valid JSON for `Config`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No home directory to put `~/.mieza` under.
    #[error("Path error: {0}")]
    Path(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
