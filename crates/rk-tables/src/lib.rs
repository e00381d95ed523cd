//! rk-tables
//!
//! Rate tables: the price list data model, static list validation, the Rate
//! Table Matcher and destination zoning.
//!
//! Pure logic, no IO. Money and weights enter through `rk-money` types, so
//! every number here is already finite by construction except the raw
//! `vat_rate` and the fields of [`QuoteRequest`], which are validated
//! explicitly.

mod matcher;
mod model;
mod request;
mod validate;
mod zone;

pub use matcher::{entry_total, find_entry, price_entry, MatchError, MatchedRate, RateBreakdown};
pub use model::{
    Accessories, DeliveryWindow, ListId, ListStatus, ListType, MarginMode, PriceList, PriceListEntry,
    RateKey, ServiceType, LEGACY_VAT_RATE,
};
pub use request::{Charges, QuoteRequest, RequestError, Shipment, ShipmentOptions};
pub use validate::{validate_list, ListIssue};
pub use zone::{
    canonical_zone, Address, Destination, ItalianZoneResolver, UnresolvedDestination, ZoneResolver,
    ZONE_CALABRIA, ZONE_ITALIA, ZONE_LIVIGNO, ZONE_SARDEGNA, ZONE_SICILIA,
};
