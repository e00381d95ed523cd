//! Rate Table Matcher.
//!
//! # Bracket selection
//!
//! Candidates are the entries whose key and service type match and whose
//! closed range `[weight_from, weight_to]` contains the weight. Among them:
//!
//! 1. the narrowest bracket (`weight_to - weight_from`) wins;
//! 2. among equally narrow brackets, the one whose `weight_to` equals the
//!    weight wins, so a weight sitting on a shared boundary belongs to the
//!    lower bracket ("up to and including");
//! 3. anything still tied is `DuplicateBracket`.
//!
//! Entry order never decides the outcome.
//!
//! # Pricing
//!
//! `base × (1 + fuel/100) + island + restricted_zone [+ cod fee] [+ insurance]`,
//! carried in micros and rounded to cents once.

use rk_money::{Grams, Micros};
use serde::{Deserialize, Serialize};

use crate::model::{Accessories, PriceList, PriceListEntry, RateKey, ServiceType};
use crate::request::Charges;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// No bracket covers the weight. Never a zero price.
    #[error("no rate for {key} ({service_type}) at {weight}")]
    MissingRate {
        key: RateKey,
        service_type: ServiceType,
        weight: Grams,
    },
    /// Several brackets are equally good matches: a table configuration error.
    #[error("{candidates} ambiguous brackets for {key} ({service_type}) at {weight}")]
    DuplicateBracket {
        key: RateKey,
        service_type: ServiceType,
        weight: Grams,
        candidates: usize,
    },
    #[error("price of matched entry overflows the fixed-point range")]
    Overflow,
}

/// Cent-rounded price of a matched entry. `base_price + surcharges == total`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBreakdown {
    pub base_price: Micros,
    pub surcharges: Micros,
    pub total: Micros,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchedRate {
    pub entry: PriceListEntry,
    pub breakdown: RateBreakdown,
}

pub fn find_entry<'a>(
    entries: &'a [PriceListEntry],
    key: &RateKey,
    service_type: ServiceType,
    weight: Grams,
) -> Result<&'a PriceListEntry, MatchError> {
    // (width, 0 if the weight sits on weight_to else 1): lower is better.
    let rank = |e: &PriceListEntry| (e.width(), u8::from(e.weight_to != weight));

    let candidates: Vec<&PriceListEntry> = entries
        .iter()
        .filter(|e| e.key.matches(key) && e.service_type == service_type && e.covers(weight))
        .collect();

    let Some(best) = candidates.iter().map(|e| rank(e)).min() else {
        return Err(MatchError::MissingRate {
            key: key.clone(),
            service_type,
            weight,
        });
    };

    let mut winners = candidates.into_iter().filter(|e| rank(e) == best);
    match (winners.next(), winners.count()) {
        (Some(entry), 0) => Ok(entry),
        (_, rest) => Err(MatchError::DuplicateBracket {
            key: key.clone(),
            service_type,
            weight,
            candidates: rest + 1,
        }),
    }
}

/// Entry total in micros, before the one rounding to cents. Callers that
/// convert the total further (VAT mode) round after converting.
pub fn entry_total(
    entry: &PriceListEntry,
    accessories: &Accessories,
    charges: &Charges,
) -> Result<Micros, MatchError> {
    let mut total = entry
        .base_price
        .grow_by(entry.fuel_surcharge_percent)
        .ok_or(MatchError::Overflow)?;

    let mut extras = vec![entry.island_surcharge, entry.restricted_zone_surcharge];
    if charges.cash_on_delivery.is_some() {
        extras.extend(accessories.cash_on_delivery_fee);
    }
    if let (Some(value), Some(rate)) = (charges.insured_value, accessories.insurance_rate_percent) {
        extras.push(value.percent_of(rate).ok_or(MatchError::Overflow)?);
    }
    for extra in extras {
        total = total.checked_add(extra).ok_or(MatchError::Overflow)?;
    }
    Ok(total)
}

pub fn price_entry(
    entry: &PriceListEntry,
    accessories: &Accessories,
    charges: &Charges,
) -> Result<RateBreakdown, MatchError> {
    let total = entry_total(entry, accessories, charges)?.round_cents();
    let base_price = entry.base_price.round_cents();
    let surcharges = total.checked_sub(base_price).ok_or(MatchError::Overflow)?;
    Ok(RateBreakdown {
        base_price,
        surcharges,
        total,
    })
}

impl PriceList {
    /// Match and price in one step, in the list's own VAT mode.
    pub fn rate_for(
        &self,
        key: &RateKey,
        service_type: ServiceType,
        weight: Grams,
        charges: &Charges,
    ) -> Result<MatchedRate, MatchError> {
        let entry = find_entry(&self.entries, key, service_type, weight)?;
        let breakdown = price_entry(entry, &self.accessories, charges)?;
        Ok(MatchedRate {
            entry: entry.clone(),
            breakdown,
        })
    }
}
