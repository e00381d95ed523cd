use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use rk_money::{Micros, Percent};
use rk_tables::{entry_total, find_entry, Charges, MatchError, PriceList};
use rk_tax::{convert, TaxError, VatMode, VatRate};
use tracing::{info, warn};

use crate::client::{CarrierQuoteClient, Probe, ProbeRequest};
use crate::plan::DriftPlan;
use crate::report::{DriftReport, SampleResult, SampleStatus};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriftSettings {
    /// Deltas up to this are `Match`.
    pub match_threshold: Percent,
    /// Deltas up to this are `Warning`; beyond it, `Error`.
    pub warning_threshold: Percent,
    /// Samples in flight at once.
    pub concurrency: usize,
    /// Per-sample limit on the carrier call.
    pub quote_timeout: Duration,
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self {
            match_threshold: Percent::points(1),
            warning_threshold: Percent::points(5),
            concurrency: 4,
            quote_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriftError {
    #[error("invalid drift settings: {0}")]
    InvalidSettings(String),
    /// The list itself cannot be priced at all (bad VAT rate).
    #[error("list {list_id} cannot be priced: {source}")]
    InvalidList {
        list_id: rk_tables::ListId,
        #[source]
        source: TaxError,
    },
}

pub struct DriftValidator {
    client: Arc<dyn CarrierQuoteClient>,
    settings: DriftSettings,
}

impl DriftValidator {
    pub fn new(client: Arc<dyn CarrierQuoteClient>, settings: DriftSettings) -> Result<Self, DriftError> {
        if settings.concurrency == 0 {
            return Err(DriftError::InvalidSettings("concurrency must be at least 1".into()));
        }
        if settings.match_threshold.is_negative() || settings.warning_threshold < settings.match_threshold {
            return Err(DriftError::InvalidSettings(format!(
                "thresholds must satisfy 0 <= match ({}) <= warning ({})",
                settings.match_threshold, settings.warning_threshold
            )));
        }
        Ok(Self { client, settings })
    }

    /// Run every probe of `plan` against `list`.
    ///
    /// A failing sample is recorded in the report; only a list that cannot
    /// be priced at all fails the run.
    pub async fn validate(&self, list: &PriceList, plan: &DriftPlan) -> Result<DriftReport, DriftError> {
        let vat = list.vat().map_err(|source| DriftError::InvalidList {
            list_id: list.id.clone(),
            source,
        })?;
        info!(list_id = %list.id, samples = plan.len(), concurrency = self.settings.concurrency, "drift run started");

        let samples: Vec<SampleResult> = stream::iter(plan.probes())
            .map(|probe| self.run_sample(list, vat, probe))
            .buffered(self.settings.concurrency)
            .collect()
            .await;

        let report = DriftReport::new(list.id.clone(), samples);
        info!(
            list_id = %list.id,
            matched = report.summary.matched,
            warning = report.summary.warning,
            error = report.summary.error,
            missing = report.summary.missing,
            unavailable = report.summary.unavailable,
            "drift run finished"
        );
        Ok(report)
    }

    async fn run_sample(&self, list: &PriceList, vat: VatRate, probe: &Probe) -> SampleResult {
        let stored = match find_entry(&list.entries, &probe.key, probe.service_type, probe.weight)
            .and_then(|e| entry_total(e, &list.accessories, &Charges::default()))
        {
            Ok(total) => total,
            Err(MatchError::MissingRate { .. }) => {
                return SampleResult::new(probe.clone(), SampleStatus::Missing);
            }
            Err(e) => {
                return SampleResult {
                    detail: Some(e.to_string()),
                    ..SampleResult::new(probe.clone(), SampleStatus::Error)
                };
            }
        };

        let request = ProbeRequest {
            list_id: list.id.clone(),
            courier_id: list.courier_id.clone(),
            probe: probe.clone(),
        };
        let live = match tokio::time::timeout(self.settings.quote_timeout, self.client.quote(&request)).await {
            Ok(Ok(q)) => q,
            Ok(Err(e)) => return self.unavailable(probe, Some(stored.round_cents()), e.to_string()),
            Err(_) => {
                let ms = self.settings.quote_timeout.as_millis();
                return self.unavailable(probe, Some(stored.round_cents()), format!("timed out after {ms}ms"));
            }
        };

        if live.amount.is_negative() {
            return SampleResult {
                stored_price: Some(stored.round_cents()),
                live_price: Some(live.amount),
                detail: Some("carrier returned a negative price".to_string()),
                ..SampleResult::new(probe.clone(), SampleStatus::Error)
            };
        }

        let stored = match in_mode(stored, list.vat_mode, live.vat_mode, vat) {
            Ok(s) => s,
            Err(e) => {
                return SampleResult {
                    detail: Some(e.to_string()),
                    ..SampleResult::new(probe.clone(), SampleStatus::Error)
                };
            }
        };
        let result = self.classify(probe, stored, live.amount);
        if matches!(result.status, SampleStatus::Warning | SampleStatus::Error) {
            warn!(
                list_id = %list.id,
                key = %probe.key,
                weight = %probe.weight,
                status = result.status.as_str(),
                delta_pct = result.delta_pct.map(Percent::to_f64),
                "price drift"
            );
        }
        result
    }

    fn unavailable(&self, probe: &Probe, stored: Option<Micros>, reason: String) -> SampleResult {
        warn!(key = %probe.key, weight = %probe.weight, reason = %reason, "live quote unavailable");
        SampleResult {
            stored_price: stored,
            detail: Some(reason),
            ..SampleResult::new(probe.clone(), SampleStatus::Unavailable)
        }
    }

    fn classify(&self, probe: &Probe, stored: Micros, live: Micros) -> SampleResult {
        let delta = stored.saturating_sub(live).abs().ratio_percent(live);
        let status = match delta {
            // Zero live price: only an equally free stored price matches.
            None if live == Micros::ZERO && stored == Micros::ZERO => SampleStatus::Match,
            None => SampleStatus::Error,
            Some(d) if d <= self.settings.match_threshold => SampleStatus::Match,
            Some(d) if d <= self.settings.warning_threshold => SampleStatus::Warning,
            Some(_) => SampleStatus::Error,
        };
        SampleResult {
            stored_price: Some(stored),
            live_price: Some(live),
            delta_pct: match (delta, status) {
                (None, SampleStatus::Match) => Some(Percent::ZERO),
                (d, _) => d,
            },
            ..SampleResult::new(probe.clone(), status)
        }
    }
}

/// The unrounded stored total expressed in the live quote's VAT mode,
/// rounded to cents once.
fn in_mode(stored: Micros, from: VatMode, to: VatMode, vat: VatRate) -> Result<Micros, TaxError> {
    if from == to {
        return Ok(stored.round_cents());
    }
    Ok(convert(stored, from, to, vat)?.round_cents())
}
