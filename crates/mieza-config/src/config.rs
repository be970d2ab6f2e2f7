//! Configuration management.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default order webhook (can be overridden at compile time via MIEZA_ENDPOINT_URL).
pub const DEFAULT_ENDPOINT_URL: &str = match option_env!("MIEZA_ENDPOINT_URL") {
    Some(url) => url,
    None => "https://script.google.com/macros/s/AKfycbxPguXexbJAnlqI9RKN64pHk0S7ISzZRMWH-Q91oVFjQgdxBQCe-qHW6oQIWr5BIyxq/exec",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Relay configuration, persisted as `config.json` under the base directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Webhook receiving order envelopes.
    pub endpoint_url: String,
    /// Seconds between background drain passes.
    pub drain_interval_secs: u64,
    /// Timeout for the immediate send issued by `submit`.
    pub fast_path_timeout_ms: u64,
    /// Timeout for each send issued by a drain pass.
    pub drain_timeout_ms: u64,
    /// Failed attempts tolerated before an envelope is dropped.
    pub max_retries: u32,
    /// Backoff for an envelope with zero failed attempts.
    pub backoff_base_ms: u64,
    /// Backoff cap.
    pub backoff_max_ms: u64,
    /// Fire a detached send alongside the durable enqueue.
    pub best_effort_enabled: bool,
    /// Keep dropped envelopes in a dead-letter list.
    pub keep_dropped: bool,
    /// Reported as `client.url` in every envelope.
    pub client_url: String,
    /// Reported as `client.ua` in every envelope.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            drain_interval_secs: 10,
            fast_path_timeout_ms: 8_000,
            drain_timeout_ms: 12_000,
            max_retries: 6,
            backoff_base_ms: 1_000,
            backoff_max_ms: 60_000,
            best_effort_enabled: true,
            keep_dropped: true,
            client_url: "cli://mieza".to_string(),
            user_agent: concat!("mieza/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the base directory, falling back to defaults.
    /// Environment variables are applied last.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        if let Some(log_level) = env_override("MIEZA_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(endpoint) = env_override("MIEZA_ENDPOINT_URL") {
            self.endpoint_url = endpoint;
        }
    }

    /// Reject settings the relay cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        self.endpoint_url()?;
        if self.drain_interval_secs == 0 {
            return Err(CoreError::Config(
                "drain_interval_secs must be positive".to_string(),
            ));
        }
        if self.fast_path_timeout_ms == 0 || self.drain_timeout_ms == 0 {
            return Err(CoreError::Config("timeouts must be positive".to_string()));
        }
        if self.backoff_base_ms > self.backoff_max_ms {
            return Err(CoreError::Config(format!(
                "backoff_base_ms ({}) exceeds backoff_max_ms ({})",
                self.backoff_base_ms, self.backoff_max_ms
            )));
        }
        Ok(())
    }

    /// Get the endpoint as a parsed URL.
    pub fn endpoint_url(&self) -> CoreResult<Url> {
        let url = Url::parse(&self.endpoint_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CoreError::Config(format!(
                "endpoint must be http(s), got {}",
                other
            ))),
        }
    }

    pub fn drain_interval(&self) -> Duration {
        Duration::from_secs(self.drain_interval_secs)
    }

    pub fn fast_path_timeout(&self) -> Duration {
        Duration::from_millis(self.fast_path_timeout_ms)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}
