use std::sync::Arc;
use std::time::Duration;

use rk_margin::{resolve, CalculationResult, MarginPolicy};
use rk_tables::{ItalianZoneResolver, ListId, QuoteRequest, RateKey, Shipment, ZoneResolver};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::comparator::ComparisonResult;
use crate::error::{ConfigurationError, QuoteError};
use crate::repository::{PriceListRepository, RepositoryError};
use crate::tenant::TenantProfile;

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    pub margin: MarginPolicy,
    /// Per-source limit for comparator lookups.
    pub source_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            margin: MarginPolicy::default(),
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QuoteOutcome {
    Calculated(CalculationResult),
    Compared(ComparisonResult),
}

impl QuoteOutcome {
    /// The calculation the caller should charge.
    pub fn selected(&self) -> &CalculationResult {
        match self {
            QuoteOutcome::Calculated(r) => r,
            QuoteOutcome::Compared(c) => &c.selected,
        }
    }
}

/// Stateless entry point: every call fetches what it needs from the
/// repository and keeps nothing afterwards.
#[derive(Clone)]
pub struct QuoteEngine {
    repo: Arc<dyn PriceListRepository>,
    zones: Arc<dyn ZoneResolver>,
    settings: EngineSettings,
}

impl QuoteEngine {
    pub fn new(repo: Arc<dyn PriceListRepository>, settings: EngineSettings) -> Self {
        Self {
            repo,
            zones: Arc::new(ItalianZoneResolver),
            settings,
        }
    }

    pub fn with_zone_resolver(mut self, zones: Arc<dyn ZoneResolver>) -> Self {
        self.zones = zones;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Price `request` for `tenant`.
    ///
    /// With `price_list_id` the named list is priced directly, whatever its
    /// status. Without it, a standard tenant uses its assigned list and a
    /// reseller goes through the comparator; auto-resolved lists must be
    /// active.
    pub async fn calculate_quote(
        &self,
        tenant: &TenantProfile,
        request: &QuoteRequest,
        price_list_id: Option<&ListId>,
    ) -> Result<QuoteOutcome, QuoteError> {
        let shipment = request.validate()?;
        let key = request.rate_key(self.zones.as_ref())?;
        debug!(key = %key, weight = %shipment.weight, service = %shipment.service_type, "quote requested");

        if let Some(id) = price_list_id {
            let r = self.calculate_for_list(id, &key, &shipment, false).await?;
            return Ok(QuoteOutcome::Calculated(r));
        }

        match tenant {
            TenantProfile::Standard { assigned_list } => {
                let r = self.calculate_for_list(assigned_list, &key, &shipment, true).await?;
                Ok(QuoteOutcome::Calculated(r))
            }
            TenantProfile::Reseller {
                own_list: Some(own),
                platform_list,
            } => self
                .compare(own, platform_list, &key, &shipment)
                .await
                .map(QuoteOutcome::Compared),
            TenantProfile::Reseller {
                own_list: None,
                platform_list,
            } => self
                .platform_only(platform_list, &key, &shipment)
                .await
                .map(QuoteOutcome::Compared),
        }
    }

    /// Fetch `list_id` and its master, then resolve the margin.
    pub async fn calculate_for_list(
        &self,
        list_id: &ListId,
        key: &RateKey,
        shipment: &Shipment,
        require_active: bool,
    ) -> Result<CalculationResult, QuoteError> {
        let list = self.repo.fetch(list_id).await?;
        if require_active && !list.is_active() {
            return Err(ConfigurationError::InactiveList {
                list_id: list.id.clone(),
                status: list.status,
            }
            .into());
        }

        let master = match list.master_list_id() {
            None => None,
            Some(master_id) => match self.repo.fetch(master_id).await {
                Ok(m) => Some(m),
                Err(RepositoryError::NotFound { .. }) => {
                    return Err(ConfigurationError::DanglingMaster {
                        list_id: list.id.clone(),
                        master_list_id: master_id.clone(),
                    }
                    .into())
                }
                Err(e) => return Err(e.into()),
            },
        };

        let result = resolve(&list, master.as_ref(), key, shipment, &self.settings.margin)?;
        for anomaly in &result.anomalies {
            warn!(list_id = %list.id, anomaly = ?anomaly, "pricing anomaly");
        }
        Ok(result)
    }
}
