use rk_margin::MarginError;
use rk_money::{Grams, Micros};
use rk_tables::{ListId, ListStatus, MatchError, RateKey, RequestError, ServiceType, UnresolvedDestination};
use rk_tax::TaxError;

use crate::comparator::ApiSource;
use crate::repository::RepositoryError;

/// Problems with stored list configuration. Always reported, never
/// auto-resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("list {list_id} references master {master_list_id}, which no longer exists")]
    DanglingMaster { list_id: ListId, master_list_id: ListId },
    #[error("list {list_id} is {status:?}, not active")]
    InactiveList { list_id: ListId, status: ListStatus },
    #[error("list {list_id} prices below supplier cost (margin {margin}) without an explicit override")]
    NegativeMargin { list_id: ListId, margin: Micros },
    #[error("list {list_id} is tagged margin_mode=configured but sets no margin")]
    MarginNotConfigured { list_id: ListId },
    #[error("list {list_id} is invalid: {reason}")]
    InvalidList { list_id: ListId, reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("invalid {field} {value}: must be finite and non-negative")]
    InvalidAmount { field: String, value: f64 },
    #[error("list {list_id} has invalid VAT rate {rate}")]
    InvalidRate { list_id: ListId, rate: f64 },
    #[error("list {list_id} has no rate for {key} ({service_type}) at {weight}")]
    MissingRate {
        list_id: ListId,
        key: RateKey,
        service_type: ServiceType,
        weight: Grams,
    },
    #[error("list {list_id} has {candidates} ambiguous brackets for {key} ({service_type}) at {weight}")]
    DuplicateBracket {
        list_id: ListId,
        key: RateKey,
        service_type: ServiceType,
        weight: Grams,
        candidates: usize,
    },
    /// Both comparator sources failed. No partial result exists.
    #[error("no rate available (reseller: {}; master: {master})", describe(.reseller))]
    NoRateAvailable {
        reseller: Option<Box<QuoteError>>,
        master: Box<QuoteError>,
    },
    #[error("{from:?} source timed out after {after_ms}ms")]
    SourceTimeout { from: ApiSource, after_ms: u64 },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    UnresolvedDestination(#[from] UnresolvedDestination),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("list {list_id}: amount overflows the fixed-point range")]
    Overflow { list_id: ListId },
}

fn describe(err: &Option<Box<QuoteError>>) -> String {
    match err {
        Some(e) => e.to_string(),
        None => "no own list".to_string(),
    }
}

impl QuoteError {
    /// Bad input from the caller. Never retried, surfaced as-is.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            QuoteError::InvalidAmount { .. } | QuoteError::InvalidRate { .. } | QuoteError::UnresolvedDestination(_)
        )
    }

    /// Stored data is wrong; an operator has to fix a list.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            QuoteError::Configuration(_) | QuoteError::DuplicateBracket { .. }
        )
    }
}

impl From<RequestError> for QuoteError {
    fn from(e: RequestError) -> Self {
        match e {
            RequestError::InvalidAmount { field, value } => QuoteError::InvalidAmount {
                field: field.to_string(),
                value,
            },
        }
    }
}

impl From<MarginError> for QuoteError {
    fn from(e: MarginError) -> Self {
        match e {
            MarginError::Tax {
                list_id,
                source: TaxError::InvalidRate { rate },
            } => QuoteError::InvalidRate { list_id, rate },
            MarginError::Tax { list_id, source } => ConfigurationError::InvalidList {
                list_id,
                reason: source.to_string(),
            }
            .into(),
            MarginError::Rate { list_id, source } => match source {
                MatchError::MissingRate {
                    key,
                    service_type,
                    weight,
                } => QuoteError::MissingRate {
                    list_id,
                    key,
                    service_type,
                    weight,
                },
                MatchError::DuplicateBracket {
                    key,
                    service_type,
                    weight,
                    candidates,
                } => QuoteError::DuplicateBracket {
                    list_id,
                    key,
                    service_type,
                    weight,
                    candidates,
                },
                MatchError::Overflow => QuoteError::Overflow { list_id },
            },
            MarginError::MissingMaster {
                list_id,
                master_list_id,
            } => ConfigurationError::DanglingMaster {
                list_id,
                master_list_id,
            }
            .into(),
            MarginError::NegativeMargin { list_id, margin } => {
                ConfigurationError::NegativeMargin { list_id, margin }.into()
            }
            MarginError::MarginNotConfigured { list_id } => ConfigurationError::MarginNotConfigured { list_id }.into(),
            e @ (MarginError::MasterMismatch { .. } | MarginError::NegativeFinalPrice { .. }) => {
                ConfigurationError::InvalidList {
                    list_id: e.list_id().clone(),
                    reason: e.to_string(),
                }
                .into()
            }
            MarginError::Overflow { list_id } => QuoteError::Overflow { list_id },
        }
    }
}
