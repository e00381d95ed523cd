use serde::{Deserialize, Serialize};

use crate::{scale_f64, ConversionError};

/// Raw units per 1%: `Percent(PERCENT_SCALE)` is one percent.
pub const PERCENT_SCALE: i64 = 1_000_000;

/// A percentage at 1e-6 scale.
///
/// Used for VAT rates, fuel surcharges, margins and insurance rates. Range
/// checks (e.g. VAT in `[0, 100]`) belong to the caller; `Percent` only
/// guarantees the value was finite when it crossed the wire.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percent(i64);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const HUNDRED: Percent = Percent(100 * PERCENT_SCALE);

    #[inline]
    pub const fn new(raw: i64) -> Self {
        Percent(raw)
    }

    /// Whole percentage points, e.g. `Percent::points(22)` is 22%.
    #[inline]
    pub const fn points(points: i64) -> Self {
        Percent(points * PERCENT_SCALE)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    pub fn from_f64(pct: f64) -> Result<Percent, ConversionError> {
        scale_f64(pct, PERCENT_SCALE).map(Percent)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / PERCENT_SCALE as f64
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<f64> for Percent {
    type Error = ConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Percent::from_f64(value)
    }
}

impl From<Percent> for f64 {
    fn from(p: Percent) -> f64 {
        p.to_f64()
    }
}

impl std::fmt::Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.to_f64())
    }
}
