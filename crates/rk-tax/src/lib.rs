//! rk-tax
//!
//! Tax normalizer: converts amounts between VAT-inclusive and VAT-exclusive
//! representations.
//!
//! Two surfaces:
//! - `f64` operations (`normalize`, `vat_amount`, `price_with_vat`,
//!   `price_excl_vat`) for callers at the wire boundary. Each validates rate
//!   then amount, computes in micros, and rounds half-up to cents exactly
//!   once, on the way out.
//! - [`VatRate`] / [`convert`] for engine-internal callers that keep
//!   sub-cent precision across several steps and round at their own output.
//!
//! Deterministic, pure logic. No IO.

mod vat;

pub use vat::{convert, validate_amount, VatRate};

use rk_money::Micros;
use serde::{Deserialize, Serialize};

/// Whether a stored amount already includes VAT.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VatMode {
    Included,
    /// Legacy lists carried no mode; they were always VAT-exclusive.
    #[default]
    Excluded,
}

impl VatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VatMode::Included => "included",
            VatMode::Excluded => "excluded",
        }
    }
}

/// Typed normalizer failures. Both indicate a caller bug, never a transient
/// condition, so nothing retries on them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaxError {
    /// Rate < 0, rate > 100, or non-finite.
    #[error("invalid VAT rate {rate}: must be finite and within [0, 100]")]
    InvalidRate { rate: f64 },
    /// Amount negative or non-finite.
    #[error("invalid amount {amount}: must be finite and non-negative")]
    InvalidAmount { amount: f64 },
    /// Amount too large for the fixed-point domain after applying the rate.
    #[error("amount {amount} overflows the fixed-point range")]
    Overflow { amount: f64 },
}

/// Convert `price` from `from` to `to` at `rate` percent.
///
/// Identity conversions still validate their inputs, then return `price`
/// unchanged (no re-rounding).
pub fn normalize(price: f64, from: VatMode, to: VatMode, rate: f64) -> Result<f64, TaxError> {
    let rate = VatRate::from_f64(rate)?;
    let amount = amount_from_f64(price)?;
    if from == to {
        return Ok(price);
    }
    let out = match to {
        VatMode::Included => rate.gross_from_net_rounded(amount)?,
        VatMode::Excluded => rate.exclusive_of(amount)?.round_cents(),
    };
    Ok(out.to_f64())
}

/// VAT owed on a VAT-exclusive price, rounded to cents.
pub fn vat_amount(price_excl: f64, rate: f64) -> Result<f64, TaxError> {
    let rate = VatRate::from_f64(rate)?;
    let amount = amount_from_f64(price_excl)?;
    Ok(rate.tax_on(amount)?.round_cents().to_f64())
}

/// VAT-inclusive price for a VAT-exclusive one.
///
/// Defined as `round_cents(price_excl) + vat_amount(price_excl, rate)`, so
/// the two public operations always add up exactly.
pub fn price_with_vat(price_excl: f64, rate: f64) -> Result<f64, TaxError> {
    let rate = VatRate::from_f64(rate)?;
    let amount = amount_from_f64(price_excl)?;
    Ok(rate.gross_from_net_rounded(amount)?.to_f64())
}

/// VAT-exclusive price for a VAT-inclusive one, rounded to cents.
pub fn price_excl_vat(price_incl: f64, rate: f64) -> Result<f64, TaxError> {
    let rate = VatRate::from_f64(rate)?;
    let amount = amount_from_f64(price_incl)?;
    Ok(rate.exclusive_of(amount)?.round_cents().to_f64())
}

fn amount_from_f64(amount: f64) -> Result<Micros, TaxError> {
    let m = Micros::from_f64(amount).map_err(|_| TaxError::InvalidAmount { amount })?;
    validate_amount(m)
}
