use std::sync::Arc;

use anyhow::{Context, Result};
use rk_quote::{QuoteEngine, TenantProfile};
use rk_tables::{ListId, QuoteRequest};
use rk_ingest::{load_document, load_price_lists, FileRepository};

use super::{load_engine_config, print_json};

pub async fn run(
    lists: &str,
    tenant: &str,
    request: &str,
    list_id: Option<&str>,
    config_paths: &[String],
) -> Result<()> {
    let cfg = load_engine_config(config_paths)?;
    let repo = Arc::new(FileRepository::new(load_price_lists(lists)?));
    let tenant: TenantProfile = load_document(tenant).context("load tenant profile")?;
    let request: QuoteRequest = load_document(request).context("load quote request")?;

    let engine = QuoteEngine::new(repo, cfg.engine_settings()?);
    let list_id = list_id.map(ListId::new);
    let outcome = engine
        .calculate_quote(&tenant, &request, list_id.as_ref())
        .await
        .context("QUOTE_FAILED")?;
    print_json(&outcome)
}
