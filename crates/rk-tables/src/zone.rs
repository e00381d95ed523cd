//! Destination -> zone code resolution.

use serde::{Deserialize, Serialize};

pub const ZONE_ITALIA: &str = "IT-ITALIA";
pub const ZONE_SARDEGNA: &str = "IT-SARDEGNA";
pub const ZONE_CALABRIA: &str = "IT-CALABRIA";
pub const ZONE_SICILIA: &str = "IT-SICILIA";
pub const ZONE_LIVIGNO: &str = "IT-LIVIGNO";

/// Old zone codes still found on entries created before the zone rename.
const LEGACY_ZONES: &[(&str, &str)] = &[
    ("IT-STD", ZONE_ITALIA),
    ("IT-CAL", ZONE_CALABRIA),
    ("IT-SIC", ZONE_SICILIA),
    ("IT-SAR", ZONE_SARDEGNA),
    ("IT-VEN", "IT-DISAGIATE"),
    ("IT-LIV", ZONE_LIVIGNO),
    ("IT-ISO", "IT-ISOLE-MINORI"),
    ("EU-Z1", "EU-ZONA1"),
];

const PROVINCE_ZONES: &[(&str, &str)] = &[
    ("CA", ZONE_SARDEGNA),
    ("NU", ZONE_SARDEGNA),
    ("OR", ZONE_SARDEGNA),
    ("SS", ZONE_SARDEGNA),
    ("RC", ZONE_CALABRIA),
    ("CZ", ZONE_CALABRIA),
    ("CS", ZONE_CALABRIA),
    ("KR", ZONE_CALABRIA),
    ("VV", ZONE_CALABRIA),
    ("PA", ZONE_SICILIA),
    ("CT", ZONE_SICILIA),
    ("ME", ZONE_SICILIA),
    ("AG", ZONE_SICILIA),
    ("CL", ZONE_SICILIA),
    ("EN", ZONE_SICILIA),
    ("RG", ZONE_SICILIA),
    ("SR", ZONE_SICILIA),
    ("TP", ZONE_SICILIA),
    ("SO", ZONE_LIVIGNO),
];

const REGION_ZONES: &[(&str, &str)] = &[
    ("sardegna", ZONE_SARDEGNA),
    ("calabria", ZONE_CALABRIA),
    ("sicilia", ZONE_SICILIA),
];

/// Map a legacy zone alias to its canonical code. Unknown codes pass through.
pub fn canonical_zone(code: &str) -> &str {
    LEGACY_ZONES
        .iter()
        .find(|(legacy, _)| *legacy == code)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(code)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Zone already known to the caller.
    Zone(String),
    /// Raw address, resolved through a [`ZoneResolver`].
    Address(Address),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot resolve destination to a zone: {reason}")]
pub struct UnresolvedDestination {
    pub reason: String,
}

pub trait ZoneResolver: Send + Sync {
    fn resolve(&self, destination: &Destination) -> Result<String, UnresolvedDestination>;
}

/// Domestic Italian zoning: islands, Calabria and Livigno have their own
/// zones, the rest of the country is `IT-ITALIA`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ItalianZoneResolver;

impl ZoneResolver for ItalianZoneResolver {
    fn resolve(&self, destination: &Destination) -> Result<String, UnresolvedDestination> {
        let addr = match destination {
            Destination::Zone(code) => {
                let code = code.trim();
                if code.is_empty() {
                    return Err(UnresolvedDestination {
                        reason: "empty zone code".to_string(),
                    });
                }
                return Ok(canonical_zone(code).to_string());
            }
            Destination::Address(addr) => addr,
        };

        let country = addr.country.as_deref().map(str::trim).unwrap_or_default();
        if country.is_empty() {
            return Err(UnresolvedDestination {
                reason: "address has no country".to_string(),
            });
        }
        if !country.eq_ignore_ascii_case("IT") {
            return Err(UnresolvedDestination {
                reason: format!("no zoning for country {country}; pass an explicit zone"),
            });
        }

        if let Some(province) = addr.province.as_deref() {
            let province = province.trim().to_ascii_uppercase();
            if let Some((_, zone)) = PROVINCE_ZONES.iter().find(|(p, _)| *p == province) {
                return Ok((*zone).to_string());
            }
        }
        if let Some(region) = addr.region.as_deref() {
            let region = region.trim().to_lowercase();
            if let Some((_, zone)) = REGION_ZONES.iter().find(|(r, _)| *r == region) {
                return Ok((*zone).to_string());
            }
        }
        Ok(ZONE_ITALIA.to_string())
    }
}
