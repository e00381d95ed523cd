//! Command handlers for ratekit.
//!
//! Shared helpers live here; command-specific logic lives in the submodules.

pub mod drift;
pub mod quote;
pub mod validate;

use anyhow::{Context, Result};
use rk_config::{load_layered_yaml, report_unused_keys, EngineConfig, UnusedKeyPolicy};
use rk_tables::{ListId, PriceList};
use tracing::{info, warn};

pub fn config_hash(paths: &[String]) -> Result<()> {
    let loaded = load_layered_yaml(paths)?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}

/// Engine config from layered files, or the defaults when none are given.
/// Unknown keys are logged, not fatal.
pub fn load_engine_config(paths: &[String]) -> Result<EngineConfig> {
    if paths.is_empty() {
        return Ok(EngineConfig::default());
    }
    let loaded = load_layered_yaml(paths)?;
    let unused = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    for key in &unused.unused_leaf_pointers {
        warn!(key = %key, "config key is not used by the engine");
    }
    info!(config_hash = %loaded.config_hash, "config loaded");
    EngineConfig::from_loaded(&loaded)
}

pub fn find_list<'a>(lists: &'a [PriceList], id: &str) -> Result<&'a PriceList> {
    let id = ListId::new(id);
    lists
        .iter()
        .find(|l| l.id == id)
        .with_context(|| format!("list {id} not found in lists file"))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}
