use std::fmt;

use rk_money::{Grams, Micros, Percent};
use rk_tax::{TaxError, VatMode, VatRate};
use serde::{Deserialize, Serialize};

use crate::zone::canonical_zone;

/// VAT rate assumed for lists stored before the rate became a column.
pub const LEGACY_VAT_RATE: f64 = 22.0;

fn legacy_vat_rate() -> f64 {
    LEGACY_VAT_RATE
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(String);

impl ListId {
    pub fn new(id: impl Into<String>) -> Self {
        ListId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListId {
    fn from(s: &str) -> Self {
        ListId(s.to_string())
    }
}

/// Supplier lists carry procurement cost. Custom lists belong to a tenant and
/// may point at the supplier list they were derived from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListType {
    Supplier,
    Custom {
        #[serde(default)]
        master_list_id: Option<ListId>,
    },
}

impl ListType {
    pub fn master(&self) -> Option<&ListId> {
        match self {
            ListType::Supplier => None,
            ListType::Custom { master_list_id } => master_list_id.as_ref(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    Active,
    #[default]
    Draft,
    Archived,
}

/// How the margin of a list is decided. See `rk-margin`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginMode {
    /// The list's own prices are the selling prices.
    Override,
    /// A percent or fixed margin on top of supplier cost.
    Configured,
    /// The process-wide default margin on top of supplier cost.
    Inherited,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Accessories {
    #[serde(default)]
    pub cash_on_delivery_fee: Option<Micros>,
    #[serde(default)]
    pub insurance_rate_percent: Option<Percent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceList {
    pub id: ListId,
    #[serde(default)]
    pub name: String,
    pub list_type: ListType,
    #[serde(default)]
    pub courier_id: Option<String>,
    #[serde(default)]
    pub default_margin_percent: Option<Percent>,
    #[serde(default)]
    pub default_margin_fixed: Option<Micros>,
    #[serde(default)]
    pub margin_mode: Option<MarginMode>,
    #[serde(default)]
    pub vat_mode: VatMode,
    /// Kept as the raw wire value; [`PriceList::vat`] validates it.
    #[serde(default = "legacy_vat_rate")]
    pub vat_rate: f64,
    #[serde(default)]
    pub status: ListStatus,
    #[serde(default)]
    pub accessories: Accessories,
    #[serde(default)]
    pub entries: Vec<PriceListEntry>,
}

impl PriceList {
    pub fn vat(&self) -> Result<VatRate, TaxError> {
        VatRate::from_f64(self.vat_rate)
    }

    pub fn is_active(&self) -> bool {
        self.status == ListStatus::Active
    }

    pub fn master_list_id(&self) -> Option<&ListId> {
        self.list_type.master()
    }
}

/// Lookup key of an entry: a geographic zone, or a size tier for lists that
/// price by parcel size instead of destination.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKey {
    Zone(String),
    Size(String),
}

impl RateKey {
    /// Zone keys compare by canonical zone code, so legacy aliases stored on
    /// old entries still match.
    pub fn matches(&self, other: &RateKey) -> bool {
        match (self, other) {
            (RateKey::Zone(a), RateKey::Zone(b)) => canonical_zone(a) == canonical_zone(b),
            (RateKey::Size(a), RateKey::Size(b)) => a == b,
            _ => false,
        }
    }

    pub fn canonical(&self) -> RateKey {
        match self {
            RateKey::Zone(z) => RateKey::Zone(canonical_zone(z).to_string()),
            RateKey::Size(s) => RateKey::Size(s.clone()),
        }
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateKey::Zone(z) => write!(f, "zone {z}"),
            RateKey::Size(s) => write!(f, "size {s}"),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    #[default]
    Standard,
    Express,
    Economy,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Standard => "standard",
            ServiceType::Express => "express",
            ServiceType::Economy => "economy",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryWindow {
    pub min_days: u32,
    pub max_days: u32,
}

/// One bracket of a rate table. Weights are kilograms on the wire, the range
/// is closed on both ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceListEntry {
    pub key: RateKey,
    #[serde(default)]
    pub service_type: ServiceType,
    pub weight_from: Grams,
    pub weight_to: Grams,
    pub base_price: Micros,
    #[serde(default)]
    pub fuel_surcharge_percent: Percent,
    #[serde(default)]
    pub island_surcharge: Micros,
    #[serde(default)]
    pub restricted_zone_surcharge: Micros,
    #[serde(default)]
    pub delivery_days: Option<DeliveryWindow>,
}

impl PriceListEntry {
    pub fn width(&self) -> i64 {
        self.weight_to.raw().saturating_sub(self.weight_from.raw())
    }

    pub fn covers(&self, weight: Grams) -> bool {
        self.weight_from <= weight && weight <= self.weight_to
    }
}
