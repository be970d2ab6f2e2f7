//! # Observability
//!
//! Centralized logging for the Mieza workspace.
//!
//! Services are **log producers**. They call [`init_with_config`] once at
//! startup and use the standard `tracing` macros everywhere else. Where the
//! lines end up is decided here:
//!
//! - Structured JSONL appended to `~/.mieza/logs/dev.jsonl`
//! - Optionally, a compact human-readable stream on stderr
//!
//! ```text
//! tail -f ~/.mieza/logs/dev.jsonl | jq
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init_with_config(observability::LogConfig {
//!         service_name: "relay".into(),
//!         default_level: "debug".into(),
//!         also_stderr: true,
//!         ..Default::default()
//!     });
//!
//!     tracing::info!("relay started");
//! }
//! ```

mod json_layer;
mod writer;

use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub use json_layer::{JsonLayer, LogEntry};
pub use writer::{CentralLogWriter, WriterFactory};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service (e.g., "relay", "cli").
    /// Included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.mieza/logs/dev.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit logs to stderr for immediate feedback.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Central log file location shared by every Mieza process.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mieza").join("logs").join("dev.jsonl"))
}

/// Initialize logging with custom configuration.
///
/// Returns `false` if a global subscriber was already installed (e.g. a
/// second call from tests); the existing subscriber is left in place.
///
/// When the log file cannot be opened, file output is skipped and stderr
/// output is forced on so nothing is silently lost.
pub fn init_with_config(config: LogConfig) -> bool {
    let log_path = config.log_path.clone().or_else(default_log_path);

    let file_writer = log_path.as_ref().and_then(|path| {
        CentralLogWriter::new(path)
            .map_err(|e| eprintln!("observability: cannot open {}: {}", path.display(), e))
            .ok()
    });
    let also_stderr = config.also_stderr || file_writer.is_none();

    let json_layer = file_writer.map(|writer| {
        JsonLayer::new(config.service_name.clone(), WriterFactory::new(writer))
            .with_filter(env_filter(&config.default_level))
    });

    let stderr_layer = also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(std::io::stderr)
            .with_filter(env_filter(&config.default_level))
    });

    let installed = tracing_subscriber::registry()
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            service = %config.service_name,
            log_path = ?log_path,
            "observability initialized"
        );
    }
    installed
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// Re-export Level for advanced filtering.
pub use tracing::Level;
