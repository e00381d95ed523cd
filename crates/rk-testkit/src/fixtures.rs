//! Canonical lists for scenario tests.
//!
//! The master (supplier) list prices IT-ITALIA standard parcels up to 5 kg
//! at 4.40 and up to 10 kg at 6.20, VAT-excluded at 22%. Custom variants
//! point at it and differ only in price or margin configuration.

use rk_money::{Grams, Micros, Percent};
use rk_quote::TenantProfile;
use rk_tables::{
    Accessories, Destination, ListId, ListStatus, ListType, MarginMode, PriceList, PriceListEntry, QuoteRequest,
    RateKey, ServiceType, ShipmentOptions, ZONE_ITALIA,
};
use rk_tax::VatMode;

pub const MASTER_ID: &str = "master";
pub const CUSTOM_ID: &str = "custom";
pub const PLATFORM_ID: &str = "platform";

pub fn entry(zone: &str, from_kg: i64, to_kg: i64, price_cents: i64) -> PriceListEntry {
    PriceListEntry {
        key: RateKey::Zone(zone.to_string()),
        service_type: ServiceType::Standard,
        weight_from: Grams::new(from_kg * 1_000),
        weight_to: Grams::new(to_kg * 1_000),
        base_price: Micros::from_cents(price_cents),
        fuel_surcharge_percent: Percent::ZERO,
        island_surcharge: Micros::ZERO,
        restricted_zone_surcharge: Micros::ZERO,
        delivery_days: None,
    }
}

pub fn master_list() -> PriceList {
    PriceList {
        id: ListId::new(MASTER_ID),
        name: "BRT supplier".into(),
        list_type: ListType::Supplier,
        courier_id: Some("brt".into()),
        default_margin_percent: None,
        default_margin_fixed: None,
        margin_mode: None,
        vat_mode: VatMode::Excluded,
        vat_rate: 22.0,
        status: ListStatus::Active,
        accessories: Accessories::default(),
        entries: vec![entry(ZONE_ITALIA, 0, 5, 440), entry(ZONE_ITALIA, 5, 10, 620)],
    }
}

/// A custom list over the master with every bracket priced at `price_cents`.
pub fn custom_list(id: &str, price_cents: i64) -> PriceList {
    let master = master_list();
    PriceList {
        id: ListId::new(id),
        name: format!("{id} tariff"),
        list_type: ListType::Custom {
            master_list_id: Some(master.id.clone()),
        },
        entries: master
            .entries
            .iter()
            .map(|e| PriceListEntry {
                base_price: Micros::from_cents(price_cents),
                ..e.clone()
            })
            .collect(),
        ..master
    }
}

/// Master prices copied, margin set as a percent.
pub fn custom_with_percent(id: &str, pct: i64) -> PriceList {
    let mut l = custom_list(id, 440);
    l.entries[1].base_price = Micros::from_cents(620);
    l.default_margin_percent = Some(Percent::points(pct));
    l.margin_mode = Some(MarginMode::Configured);
    l
}

/// Platform list a reseller falls back to: the master price plus 10%.
pub fn platform_list() -> PriceList {
    custom_with_percent(PLATFORM_ID, 10)
}

pub fn reseller(own_list: Option<&str>) -> TenantProfile {
    TenantProfile::Reseller {
        own_list: own_list.map(ListId::new),
        platform_list: ListId::new(PLATFORM_ID),
    }
}

pub fn standard_tenant(list: &str) -> TenantProfile {
    TenantProfile::Standard {
        assigned_list: ListId::new(list),
    }
}

pub fn request_kg(weight_kg: f64) -> QuoteRequest {
    QuoteRequest {
        destination: Destination::Zone(ZONE_ITALIA.into()),
        size_label: None,
        service_type: ServiceType::Standard,
        weight_kg,
        volume_m3: None,
        options: ShipmentOptions::default(),
    }
}
