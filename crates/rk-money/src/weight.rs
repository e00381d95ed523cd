use serde::{Deserialize, Serialize};

use crate::{scale_f64, ConversionError};

const GRAMS_PER_KG: i64 = 1_000;

/// Shipment weight in whole grams.
///
/// Rate tables and requests speak kilograms on the wire; converting to an
/// integer keeps bracket comparisons and width tie-breaks exact.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Grams(i64);

impl Grams {
    pub const ZERO: Grams = Grams(0);

    #[inline]
    pub const fn new(grams: i64) -> Self {
        Grams(grams)
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Kilograms to grams, rounding half up. Negative weights are rejected.
    pub fn from_kg(kg: f64) -> Result<Grams, ConversionError> {
        let g = scale_f64(kg, GRAMS_PER_KG)?;
        if g < 0 {
            return Err(ConversionError::Negative);
        }
        Ok(Grams(g))
    }

    pub fn to_kg(self) -> f64 {
        self.0 as f64 / GRAMS_PER_KG as f64
    }
}

impl TryFrom<f64> for Grams {
    type Error = ConversionError;

    fn try_from(kg: f64) -> Result<Self, Self::Error> {
        Grams::from_kg(kg)
    }
}

impl From<Grams> for f64 {
    fn from(g: Grams) -> f64 {
        g.to_kg()
    }
}

impl std::fmt::Display for Grams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}kg", self.to_kg())
    }
}
