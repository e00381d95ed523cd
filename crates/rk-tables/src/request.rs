use rk_money::{Grams, Micros};
use serde::{Deserialize, Serialize};

use crate::model::{RateKey, ServiceType};
use crate::zone::{Destination, UnresolvedDestination, ZoneResolver};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentOptions {
    #[serde(default)]
    pub declared_value: Option<f64>,
    #[serde(default)]
    pub insurance: bool,
    #[serde(default)]
    pub cash_on_delivery: Option<f64>,
}

/// A quote request as it arrives from a caller. Numbers stay `f64` until
/// [`QuoteRequest::validate`] moves them into the fixed-point domain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub destination: Destination,
    /// Selects a size-keyed tier instead of the destination zone.
    #[serde(default)]
    pub size_label: Option<String>,
    #[serde(default)]
    pub service_type: ServiceType,
    pub weight_kg: f64,
    #[serde(default)]
    pub volume_m3: Option<f64>,
    #[serde(default)]
    pub options: ShipmentOptions,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("invalid {field} {value}: must be finite and non-negative")]
    InvalidAmount { field: &'static str, value: f64 },
}

/// Optional charges a matched entry is priced with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Charges {
    pub cash_on_delivery: Option<Micros>,
    pub insured_value: Option<Micros>,
}

/// A request whose numbers have all passed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct Shipment {
    pub weight: Grams,
    pub service_type: ServiceType,
    pub charges: Charges,
}

fn checked_money(field: &'static str, value: f64) -> Result<Micros, RequestError> {
    let invalid = RequestError::InvalidAmount { field, value };
    match Micros::from_f64(value) {
        Ok(m) if m.is_non_negative() => Ok(m),
        _ => Err(invalid),
    }
}

impl QuoteRequest {
    pub fn validate(&self) -> Result<Shipment, RequestError> {
        let weight = Grams::from_kg(self.weight_kg).map_err(|_| RequestError::InvalidAmount {
            field: "weight_kg",
            value: self.weight_kg,
        })?;
        if let Some(v) = self.volume_m3 {
            if !v.is_finite() || v < 0.0 {
                return Err(RequestError::InvalidAmount {
                    field: "volume_m3",
                    value: v,
                });
            }
        }
        let declared = self
            .options
            .declared_value
            .map(|v| checked_money("declared_value", v))
            .transpose()?;
        let cash_on_delivery = self
            .options
            .cash_on_delivery
            .map(|v| checked_money("cash_on_delivery", v))
            .transpose()?;

        Ok(Shipment {
            weight,
            service_type: self.service_type,
            charges: Charges {
                cash_on_delivery,
                insured_value: if self.options.insurance { declared } else { None },
            },
        })
    }

    /// The key to look up: the size tier when one was requested, otherwise
    /// the resolved destination zone.
    pub fn rate_key(&self, resolver: &dyn ZoneResolver) -> Result<RateKey, UnresolvedDestination> {
        match &self.size_label {
            Some(label) => Ok(RateKey::Size(label.clone())),
            None => resolver.resolve(&self.destination).map(RateKey::Zone),
        }
    }
}
