//! Durable key-value substrate for the order queue.
//!
//! Values are opaque strings replaced wholesale on every write. Two backends:
//! - [`SqliteKvStore`]: a single-table SQLite database that survives restarts
//! - [`InMemoryKvStore`]: process-local map for tests and dry runs

mod error;
mod memory;
mod migrations;
mod sqlite;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryKvStore;
pub use sqlite::SqliteKvStore;
pub use traits::KeyValueStore;
