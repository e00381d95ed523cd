use rk_money::{Micros, Percent};

use crate::{TaxError, VatMode};

/// A VAT rate proven to lie within `[0, 100]` percent.
///
/// Holding a `VatRate` means the divide-by-zero case of an
/// included -> excluded conversion (rate = -100%) is unreachable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VatRate(Percent);

impl VatRate {
    pub const ZERO: VatRate = VatRate(Percent::ZERO);

    pub fn new(rate: Percent) -> Result<VatRate, TaxError> {
        if rate.is_negative() || rate > Percent::HUNDRED {
            return Err(TaxError::InvalidRate {
                rate: rate.to_f64(),
            });
        }
        Ok(VatRate(rate))
    }

    pub fn from_f64(rate: f64) -> Result<VatRate, TaxError> {
        // Range check on the raw f64 first: huge finite values must still
        // report InvalidRate rather than a conversion error.
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(TaxError::InvalidRate { rate });
        }
        let pct = Percent::from_f64(rate).map_err(|_| TaxError::InvalidRate { rate })?;
        VatRate::new(pct)
    }

    pub fn percent(self) -> Percent {
        self.0
    }

    /// VAT on a net amount, at micro precision.
    pub fn tax_on(self, net: Micros) -> Result<Micros, TaxError> {
        net.percent_of(self.0).ok_or(TaxError::Overflow {
            amount: net.to_f64(),
        })
    }

    /// Gross amount for a net one, at micro precision.
    pub fn inclusive_of(self, net: Micros) -> Result<Micros, TaxError> {
        net.grow_by(self.0).ok_or(TaxError::Overflow {
            amount: net.to_f64(),
        })
    }

    /// Net amount for a gross one, at micro precision.
    pub fn exclusive_of(self, gross: Micros) -> Result<Micros, TaxError> {
        gross.shrink_by(self.0).ok_or(TaxError::Overflow {
            amount: gross.to_f64(),
        })
    }

    /// `round_cents(net) + round_cents(tax_on(net))`.
    ///
    /// The rounded gross is assembled from its rounded parts so that
    /// `net + vat == gross` holds exactly at cent precision.
    pub fn gross_from_net_rounded(self, net: Micros) -> Result<Micros, TaxError> {
        let tax = self.tax_on(net)?.round_cents();
        net.round_cents()
            .checked_add(tax)
            .ok_or(TaxError::Overflow {
                amount: net.to_f64(),
            })
    }
}

/// Reject negative amounts.
pub fn validate_amount(amount: Micros) -> Result<Micros, TaxError> {
    if amount.is_negative() {
        return Err(TaxError::InvalidAmount {
            amount: amount.to_f64(),
        });
    }
    Ok(amount)
}

/// Convert between VAT modes at micro precision (no cent rounding).
///
/// Engine-internal: callers that chain several conversions round once at
/// their own output boundary.
pub fn convert(amount: Micros, from: VatMode, to: VatMode, rate: VatRate) -> Result<Micros, TaxError> {
    validate_amount(amount)?;
    match (from, to) {
        (VatMode::Included, VatMode::Included) | (VatMode::Excluded, VatMode::Excluded) => Ok(amount),
        (VatMode::Excluded, VatMode::Included) => rate.inclusive_of(amount),
        (VatMode::Included, VatMode::Excluded) => rate.exclusive_of(amount),
    }
}
