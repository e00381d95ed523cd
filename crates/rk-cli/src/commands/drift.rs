use std::sync::Arc;

use anyhow::{bail, Result};
use rk_drift::{DriftPlan, DriftValidator};
use rk_ingest::{load_price_lists, RecordedCarrier};
use tracing::info;

use super::{find_list, load_engine_config, print_json};

/// The report is printed even when the run finds errors; the exit status
/// then says so.
pub async fn run(lists: &str, list_id: &str, live: &str, config_paths: &[String]) -> Result<()> {
    let cfg = load_engine_config(config_paths)?;
    let lists = load_price_lists(lists)?;
    let list = find_list(&lists, list_id)?;
    let carrier = RecordedCarrier::load_csv(live)?;
    info!(list_id = %list.id, recorded = carrier.len(), "recorded quotes loaded");

    let plan = DriftPlan::sampled(list, cfg.drift.sample_size, cfg.drift.seed);
    let validator = DriftValidator::new(Arc::new(carrier), cfg.drift_settings()?)?;
    let report = validator.validate(list, &plan).await?;
    print_json(&report)?;

    if report.summary.has_errors() {
        bail!(
            "DRIFT_ERRORS: {} of {} sample(s) beyond the warning threshold",
            report.summary.error,
            report.summary.total
        );
    }
    Ok(())
}
