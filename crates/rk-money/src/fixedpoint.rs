//! Fixed-point money type.
//!
//! All money amounts use a 1e-6 (micros) fixed-point representation stored
//! as `i64`. `Micros` wraps the raw integer so the type system keeps money
//! apart from weights, percentages and counters.
//!
//! # Rounding
//!
//! Percentage arithmetic (`percent_of`, `grow_by`, `shrink_by`) is carried
//! out in `i128` and rounded half away from zero to the nearest micro. That
//! sub-cent precision is kept through a whole calculation; `round_cents` is
//! the single display-precision rounding step and belongs at the output
//! boundary of a public operation, never between intermediate steps.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::percent::{Percent, PERCENT_SCALE};
use crate::{div_round_half_up, scale_f64, ConversionError};

/// 1 currency unit = 1_000_000 micros.
pub const MICROS_PER_UNIT: i64 = 1_000_000;

/// One cent in micros.
pub const CENT_MICROS: i64 = MICROS_PER_UNIT / 100;

/// 100% expressed in `Percent` raw units.
const HUNDRED_PERCENT: i128 = 100 * PERCENT_SCALE as i128;

/// A fixed-point monetary amount at 1e-6 scale.
///
/// There is intentionally no `From<i64>`: callers must be deliberate about
/// when a raw integer represents money. Serialized as a plain `f64` so wire
/// formats stay human-readable; deserialization goes through
/// [`Micros::from_f64`] and therefore rejects non-finite values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Micros(i64);

impl Micros {
    pub const ZERO: Micros = Micros(0);
    pub const MAX: Micros = Micros(i64::MAX);
    pub const MIN: Micros = Micros(i64::MIN);

    #[inline]
    pub const fn new(raw: i64) -> Self {
        Micros(raw)
    }

    /// Whole cents, e.g. `Micros::from_cents(440)` is 4.40.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Micros(cents * CENT_MICROS)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Convert a wire-boundary `f64` amount into micros.
    ///
    /// Rounds to the nearest micro. Negative amounts are representable;
    /// callers that require non-negative money check [`Micros::is_negative`].
    pub fn from_f64(amount: f64) -> Result<Micros, ConversionError> {
        scale_f64(amount, MICROS_PER_UNIT).map(Micros)
    }

    /// Convert to `f64` for serialization. Only call at the wire boundary.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT as f64
    }

    #[inline]
    pub fn checked_add(self, rhs: Micros) -> Option<Micros> {
        self.0.checked_add(rhs.0).map(Micros)
    }

    #[inline]
    pub fn checked_sub(self, rhs: Micros) -> Option<Micros> {
        self.0.checked_sub(rhs.0).map(Micros)
    }

    #[inline]
    pub fn saturating_add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }

    #[inline]
    pub fn saturating_sub(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_sub(rhs.0))
    }

    /// `Micros::MIN.abs()` saturates to `Micros::MAX`.
    #[inline]
    pub fn abs(self) -> Micros {
        Micros(self.0.saturating_abs())
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_non_negative(self) -> bool {
        self.0 >= 0
    }

    /// Round half away from zero to whole cents.
    pub fn round_cents(self) -> Micros {
        let cents = div_round_half_up(self.0 as i128, CENT_MICROS as i128);
        // |cents * CENT_MICROS| <= |self| + CENT_MICROS / 2; only the extreme
        // edges of the range can overflow, and those saturate.
        Micros(i64::try_from(cents * CENT_MICROS as i128).unwrap_or(if cents < 0 {
            i64::MIN
        } else {
            i64::MAX
        }))
    }

    /// `self × pct / 100`, rounded to the micro. `None` on overflow.
    pub fn percent_of(self, pct: Percent) -> Option<Micros> {
        let num = self.0 as i128 * pct.raw() as i128;
        to_micros(div_round_half_up(num, HUNDRED_PERCENT))
    }

    /// `self × (1 + pct / 100)`, rounded to the micro. `None` on overflow.
    pub fn grow_by(self, pct: Percent) -> Option<Micros> {
        let factor = HUNDRED_PERCENT + pct.raw() as i128;
        let num = (self.0 as i128).checked_mul(factor)?;
        to_micros(div_round_half_up(num, HUNDRED_PERCENT))
    }

    /// `self / (1 + pct / 100)`, rounded to the micro.
    ///
    /// `None` when the divisor is zero (`pct == -100%`) or on overflow.
    /// Callers validate rates first; this is the last line of defence.
    pub fn shrink_by(self, pct: Percent) -> Option<Micros> {
        let divisor = HUNDRED_PERCENT + pct.raw() as i128;
        if divisor == 0 {
            return None;
        }
        let num = (self.0 as i128).checked_mul(HUNDRED_PERCENT)?;
        to_micros(div_round_half_up(num, divisor))
    }

    /// `self` as a percentage of `base`, rounded to the nearest `Percent` unit.
    ///
    /// `None` when `base` is zero or the result does not fit.
    pub fn ratio_percent(self, base: Micros) -> Option<Percent> {
        if base.0 == 0 {
            return None;
        }
        let num = (self.0 as i128).checked_mul(HUNDRED_PERCENT)?;
        i64::try_from(div_round_half_up(num, base.0 as i128))
            .ok()
            .map(Percent::new)
    }

    /// `|self - other| <= tolerance`, saturating.
    pub fn within(self, other: Micros, tolerance: Micros) -> bool {
        self.saturating_sub(other).abs() <= tolerance.abs()
    }
}

fn to_micros(v: i128) -> Option<Micros> {
    i64::try_from(v).ok().map(Micros)
}

impl TryFrom<f64> for Micros {
    type Error = ConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Micros::from_f64(value)
    }
}

impl From<Micros> for f64 {
    fn from(m: Micros) -> f64 {
        m.to_f64()
    }
}

// ---------------------------------------------------------------------------
// Arithmetic operators (closed over Micros)
// ---------------------------------------------------------------------------

impl Add for Micros {
    type Output = Micros;
    #[inline]
    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0 + rhs.0)
    }
}

impl Sub for Micros {
    type Output = Micros;
    #[inline]
    fn sub(self, rhs: Micros) -> Micros {
        Micros(self.0 - rhs.0)
    }
}

impl Neg for Micros {
    type Output = Micros;
    #[inline]
    fn neg(self) -> Micros {
        Micros(-self.0)
    }
}

impl AddAssign for Micros {
    #[inline]
    fn add_assign(&mut self, rhs: Micros) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Micros {
    #[inline]
    fn sub_assign(&mut self, rhs: Micros) {
        self.0 -= rhs.0;
    }
}

impl Sum for Micros {
    fn sum<I: Iterator<Item = Micros>>(iter: I) -> Micros {
        iter.fold(Micros::ZERO, |acc, m| acc + m)
    }
}

impl std::fmt::Display for Micros {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let units = self.0 / MICROS_PER_UNIT;
        let frac = (self.0 % MICROS_PER_UNIT).abs();
        // Between -1 and 0 the integer part truncates to 0 and loses the sign.
        if self.0 < 0 && units == 0 {
            write!(f, "-{units}.{frac:06}")
        } else {
            write!(f, "{units}.{frac:06}")
        }
    }
}
