use std::time::Duration;

use anyhow::{bail, Context, Result};
use rk_drift::DriftSettings;
use rk_margin::MarginPolicy;
use rk_money::{Micros, Percent};
use rk_quote::EngineSettings;
use serde::{Deserialize, Serialize};

use crate::LoadedConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Margin applied to lists with neither a configured margin nor a price
    /// override.
    pub default_margin_percent: f64,
    /// Tolerance for "list price equals supplier price", in currency units.
    pub margin_epsilon: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_margin_percent: 0.0,
            margin_epsilon: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparatorConfig {
    pub source_timeout_ms: u64,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self { source_timeout_ms: 5_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Probes drawn by a sampled plan.
    pub sample_size: usize,
    pub concurrency: usize,
    pub quote_timeout_ms: u64,
    pub match_threshold_pct: f64,
    pub warning_threshold_pct: f64,
    /// Seed for sampled plans; the same seed draws the same probes.
    pub seed: u64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            sample_size: 20,
            concurrency: 4,
            quote_timeout_ms: 10_000,
            match_threshold_pct: 1.0,
            warning_threshold_pct: 5.0,
            seed: 0,
        }
    }
}

/// Typed view of the effective configuration. Every field has a default, so
/// an empty document is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pricing: PricingConfig,
    pub comparator: ComparatorConfig,
    pub drift: DriftConfig,
}

impl EngineConfig {
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        let cfg: EngineConfig =
            serde_json::from_value(loaded.config_json.clone()).context("config does not match engine schema")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("pricing.default_margin_percent", self.pricing.default_margin_percent)?;
        non_negative("pricing.margin_epsilon", self.pricing.margin_epsilon)?;
        non_negative("drift.match_threshold_pct", self.drift.match_threshold_pct)?;
        non_negative("drift.warning_threshold_pct", self.drift.warning_threshold_pct)?;
        if self.drift.warning_threshold_pct < self.drift.match_threshold_pct {
            bail!(
                "CONFIG_INVALID drift.warning_threshold_pct ({}) is below drift.match_threshold_pct ({})",
                self.drift.warning_threshold_pct,
                self.drift.match_threshold_pct
            );
        }
        if self.drift.concurrency == 0 {
            bail!("CONFIG_INVALID drift.concurrency must be at least 1");
        }
        if self.comparator.source_timeout_ms == 0 {
            bail!("CONFIG_INVALID comparator.source_timeout_ms must be positive");
        }
        if self.drift.quote_timeout_ms == 0 {
            bail!("CONFIG_INVALID drift.quote_timeout_ms must be positive");
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> Result<EngineSettings> {
        Ok(EngineSettings {
            margin: MarginPolicy {
                default_margin_percent: Percent::from_f64(self.pricing.default_margin_percent)
                    .context("pricing.default_margin_percent")?,
                epsilon: Micros::from_f64(self.pricing.margin_epsilon).context("pricing.margin_epsilon")?,
            },
            source_timeout: Duration::from_millis(self.comparator.source_timeout_ms),
        })
    }

    pub fn drift_settings(&self) -> Result<DriftSettings> {
        Ok(DriftSettings {
            match_threshold: Percent::from_f64(self.drift.match_threshold_pct).context("drift.match_threshold_pct")?,
            warning_threshold: Percent::from_f64(self.drift.warning_threshold_pct)
                .context("drift.warning_threshold_pct")?,
            concurrency: self.drift.concurrency,
            quote_timeout: Duration::from_millis(self.drift.quote_timeout_ms),
        })
    }
}

fn non_negative(field: &str, v: f64) -> Result<()> {
    if !v.is_finite() || v < 0.0 {
        bail!("CONFIG_INVALID {field} must be finite and non-negative, got {v}");
    }
    Ok(())
}
