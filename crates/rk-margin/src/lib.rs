//! rk-margin
//!
//! Margin Resolver: decides the margin and final price of a quote from a
//! custom list and, when it has one, its master list.
//!
//! Pure function of its inputs. Both lists are passed in by the caller;
//! nothing here fetches, caches or reads the clock.
//!
//! All margin arithmetic is VAT-exclusive. Each list's matched total is
//! normalized out of its own VAT mode first, and the final price is reported
//! back in the custom list's mode.

mod resolver;

pub use resolver::resolve;

use rk_money::{Micros, Percent};
use rk_tables::{ListId, MatchError, PriceListEntry, RateBreakdown};
use rk_tax::{TaxError, VatMode};
use serde::{Deserialize, Serialize};

/// Process-wide margin settings.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MarginPolicy {
    /// Applied when a list has no configured margin and no price override.
    pub default_margin_percent: Percent,
    /// Prices closer than this count as equal when inferring an override.
    pub epsilon: Micros,
}

impl Default for MarginPolicy {
    fn default() -> Self {
        Self {
            default_margin_percent: Percent::ZERO,
            epsilon: Micros::from_cents(1),
        }
    }
}

/// Which rule produced the margin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginSource {
    /// Percent or fixed margin set on the list.
    Configured,
    /// The list's own price is the selling price.
    ListOverride,
    /// `MarginPolicy::default_margin_percent`.
    ProcessDefault,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Selling below supplier cost, explicitly configured.
    NegativeMargin { margin: Micros },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub list_id: ListId,
    pub master_list_id: Option<ListId>,
    /// Matched entry of the custom list, as stored.
    pub base_price: Micros,
    pub surcharges: Micros,
    /// Cost basis of the margin (VAT-exclusive): supplier price when known,
    /// else the list's own price.
    pub total_cost: Micros,
    /// VAT-exclusive master price; `None` for a custom list without master.
    pub supplier_price: Option<Micros>,
    /// VAT-exclusive price of the custom list's own entry.
    pub list_price: Micros,
    /// VAT-exclusive.
    pub margin: Micros,
    pub margin_source: MarginSource,
    /// In the custom list's VAT mode.
    pub final_price: Micros,
    pub vat_mode: VatMode,
    pub vat_rate: Percent,
    pub vat_amount: Micros,
    pub total_price_with_vat: Micros,
    pub matched_entry: PriceListEntry,
    pub supplier_entry: Option<PriceListEntry>,
    pub anomalies: Vec<Anomaly>,
}

impl CalculationResult {
    pub fn breakdown(&self) -> RateBreakdown {
        RateBreakdown {
            base_price: self.base_price,
            surcharges: self.surcharges,
            total: self.base_price + self.surcharges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarginError {
    #[error("list {list_id}: {source}")]
    Tax {
        list_id: ListId,
        #[source]
        source: TaxError,
    },
    #[error("list {list_id}: {source}")]
    Rate {
        list_id: ListId,
        #[source]
        source: MatchError,
    },
    /// Custom list points at a master that was not supplied.
    #[error("list {list_id} references master {master_list_id}, which was not found")]
    MissingMaster { list_id: ListId, master_list_id: ListId },
    #[error("list {list_id} expects master {expected:?}, got {got:?}")]
    MasterMismatch {
        list_id: ListId,
        expected: Option<ListId>,
        got: Option<ListId>,
    },
    /// List price below supplier cost with no explicit configuration saying so.
    #[error("list {list_id}: inferred margin {margin} is negative")]
    NegativeMargin { list_id: ListId, margin: Micros },
    #[error("list {list_id}: final price {final_price} is negative")]
    NegativeFinalPrice { list_id: ListId, final_price: Micros },
    #[error("list {list_id} is tagged margin_mode=configured but sets no margin")]
    MarginNotConfigured { list_id: ListId },
    #[error("list {list_id}: margin arithmetic overflows the fixed-point range")]
    Overflow { list_id: ListId },
}

impl MarginError {
    /// The list whose data caused the failure.
    pub fn list_id(&self) -> &ListId {
        match self {
            MarginError::Tax { list_id, .. }
            | MarginError::Rate { list_id, .. }
            | MarginError::MissingMaster { list_id, .. }
            | MarginError::MasterMismatch { list_id, .. }
            | MarginError::NegativeMargin { list_id, .. }
            | MarginError::NegativeFinalPrice { list_id, .. }
            | MarginError::MarginNotConfigured { list_id }
            | MarginError::Overflow { list_id } => list_id,
        }
    }
}
