//! `rtry config` – show the effective configuration.

use anyhow::{Context, Result};
use rtry_core::config::RtryConfig;

pub fn run_config(cfg: &RtryConfig) -> Result<()> {
    let toml = toml::to_string_pretty(cfg).context("serialize config")?;
    print!("{}", toml);
    Ok(())
}
