//! `mieza config` commands.

use anyhow::bail;
use mieza_config::{Config, Paths};
use tracing::info;

/// Write a default `config.json`. An existing file is kept unless `force` is set.
pub fn init_config(paths: &Paths, force: bool) -> anyhow::Result<()> {
    let path = paths.config_file();
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::default().save(paths)?;
    info!(path = %path.display(), "Wrote default config");
    println!("Wrote {}", path.display());
    Ok(())
}

/// Print the effective configuration, environment overrides included.
pub fn show_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
