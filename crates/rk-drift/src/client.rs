//! Carrier-quote collaborator boundary.
//!
//! Only the trait and its wire types live here. Fetching live quotes over
//! the network is the collaborator's job; retries, if any, belong to it too.

use rk_money::{Grams, Micros};
use rk_tables::{ListId, RateKey, ServiceType};
use rk_tax::VatMode;
use serde::{Deserialize, Serialize};

/// One (key, service, weight) combination to price.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Probe {
    pub key: RateKey,
    pub service_type: ServiceType,
    pub weight: Grams,
}

/// What the carrier is asked to quote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeRequest {
    pub list_id: ListId,
    pub courier_id: Option<String>,
    #[serde(flatten)]
    pub probe: Probe,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalQuote {
    pub amount: Micros,
    #[serde(default)]
    pub vat_mode: VatMode,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CarrierError {
    #[error("carrier unavailable: {0}")]
    Unavailable(String),
    #[error("carrier rejected the request: {0}")]
    Rejected(String),
    #[error("carrier has no quote for this combination")]
    NoQuote,
}

#[async_trait::async_trait]
pub trait CarrierQuoteClient: Send + Sync {
    async fn quote(&self, request: &ProbeRequest) -> Result<ExternalQuote, CarrierError>;
}
