//! Quote Comparator.
//!
//! For reseller tenants both rate sources are evaluated independently and
//! concurrently, each under its own timeout. The reseller's own price wins
//! whenever that source succeeds; otherwise the master price is used. If
//! both fail the request fails with `NoRateAvailable` and nothing else.

use rk_margin::CalculationResult;
use rk_money::Micros;
use rk_tables::{ListId, RateKey, Shipment};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::QuoteEngine;
use crate::error::QuoteError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiSource {
    /// The reseller's own list.
    Reseller,
    /// The platform list, after the reseller source failed.
    Master,
    /// The platform list, because the reseller has no list of its own.
    Default,
}

impl ApiSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiSource::Reseller => "reseller",
            ApiSource::Master => "master",
            ApiSource::Default => "default",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub api_source: ApiSource,
    /// The calculation that was selected.
    pub selected: CalculationResult,
    pub reseller_price: Option<Micros>,
    pub master_price: Option<Micros>,
    /// `reseller_price - master_price` when both sources succeeded.
    pub price_difference: Option<Micros>,
    pub reseller_failure: Option<String>,
    pub master_failure: Option<String>,
}

/// Apply the selection policy to the two source outcomes.
pub fn select(
    reseller: Result<CalculationResult, QuoteError>,
    master: Result<CalculationResult, QuoteError>,
) -> Result<ComparisonResult, QuoteError> {
    match (reseller, master) {
        (Ok(r), master) => {
            let (master_price, master_failure) = match &master {
                Ok(m) => (Some(m.final_price), None),
                Err(e) => (None, Some(e.to_string())),
            };
            Ok(ComparisonResult {
                api_source: ApiSource::Reseller,
                reseller_price: Some(r.final_price),
                master_price,
                price_difference: master_price.and_then(|m| r.final_price.checked_sub(m)),
                selected: r,
                reseller_failure: None,
                master_failure,
            })
        }
        (Err(re), Ok(m)) => Ok(ComparisonResult {
            api_source: ApiSource::Master,
            reseller_price: None,
            master_price: Some(m.final_price),
            price_difference: None,
            selected: m,
            reseller_failure: Some(re.to_string()),
            master_failure: None,
        }),
        (Err(re), Err(me)) => Err(QuoteError::NoRateAvailable {
            reseller: Some(Box::new(re)),
            master: Box::new(me),
        }),
    }
}

impl QuoteEngine {
    /// One comparator source, bounded by the configured timeout. A timeout is
    /// reported like any other source failure.
    pub(crate) async fn timed_source(
        &self,
        from: ApiSource,
        list_id: &ListId,
        key: &RateKey,
        shipment: &Shipment,
    ) -> Result<CalculationResult, QuoteError> {
        let limit = self.settings().source_timeout;
        let res = match tokio::time::timeout(limit, self.calculate_for_list(list_id, key, shipment, true)).await {
            Ok(res) => res,
            Err(_) => Err(QuoteError::SourceTimeout {
                from,
                after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            }),
        };
        match &res {
            Ok(r) => debug!(source = from.as_str(), list_id = %list_id, final_price = %r.final_price, "source priced"),
            Err(e) => debug!(source = from.as_str(), list_id = %list_id, error = %e, "source failed"),
        }
        res
    }

    pub(crate) async fn compare(
        &self,
        own_list: &ListId,
        platform_list: &ListId,
        key: &RateKey,
        shipment: &Shipment,
    ) -> Result<ComparisonResult, QuoteError> {
        let (reseller, master) = tokio::join!(
            self.timed_source(ApiSource::Reseller, own_list, key, shipment),
            self.timed_source(ApiSource::Master, platform_list, key, shipment),
        );

        let out = select(reseller, master);
        match &out {
            Ok(c) if c.api_source == ApiSource::Master => warn!(
                list_id = %own_list,
                fallback = %platform_list,
                reason = c.reseller_failure.as_deref().unwrap_or_default(),
                "reseller source failed, using master price"
            ),
            Ok(_) => {}
            Err(e) => warn!(list_id = %own_list, error = %e, "both rate sources failed"),
        }
        out
    }

    /// A reseller without its own list quotes from the platform list alone.
    pub(crate) async fn platform_only(
        &self,
        platform_list: &ListId,
        key: &RateKey,
        shipment: &Shipment,
    ) -> Result<ComparisonResult, QuoteError> {
        match self.timed_source(ApiSource::Default, platform_list, key, shipment).await {
            Ok(m) => Ok(ComparisonResult {
                api_source: ApiSource::Default,
                reseller_price: None,
                master_price: Some(m.final_price),
                price_difference: None,
                selected: m,
                reseller_failure: None,
                master_failure: None,
            }),
            Err(e) => Err(QuoteError::NoRateAvailable {
                reseller: None,
                master: Box::new(e),
            }),
        }
    }
}
