//! Live carrier quotes recorded to CSV and replayed during drift runs.
//!
//! Columns: `key_kind,key,service_type,weight_kg,amount,vat_mode`.
//! `key_kind` is `zone` or `size`; `vat_mode` may be blank (excluded).

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rk_drift::{CarrierError, CarrierQuoteClient, ExternalQuote, Probe, ProbeRequest};
use rk_money::{Grams, Micros};
use rk_tables::{RateKey, ServiceType};
use rk_tax::VatMode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RecordedRow {
    key_kind: String,
    key: String,
    service_type: ServiceType,
    weight_kg: f64,
    amount: f64,
    #[serde(default)]
    vat_mode: Option<VatMode>,
}

/// Replays live quotes captured earlier. Loaded once, read-only afterwards.
/// Probes with no recorded row answer `NoQuote`.
#[derive(Debug, Default)]
pub struct RecordedCarrier {
    quotes: HashMap<Probe, ExternalQuote>,
}

impl RecordedCarrier {
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let rdr =
            csv::Reader::from_path(path).with_context(|| format!("open live quotes csv: {}", path.display()))?;
        Self::from_reader(rdr)
    }

    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_reader(csv::Reader::from_reader(text.as_bytes()))
    }

    fn from_reader<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<Self> {
        let mut quotes = HashMap::new();
        for (i, row) in rdr.deserialize::<RecordedRow>().enumerate() {
            let n = i + 1;
            let row = row.with_context(|| format!("live quotes row {n}"))?;
            let key = match row.key_kind.trim() {
                "zone" => RateKey::Zone(row.key),
                "size" => RateKey::Size(row.key),
                other => bail!("live quotes row {n}: unknown key_kind {other:?}"),
            };
            let probe = Probe {
                key: key.canonical(),
                service_type: row.service_type,
                weight: Grams::from_kg(row.weight_kg).with_context(|| format!("live quotes row {n} weight"))?,
            };
            let quote = ExternalQuote {
                amount: Micros::from_f64(row.amount).with_context(|| format!("live quotes row {n} amount"))?,
                vat_mode: row.vat_mode.unwrap_or_default(),
            };
            if quotes.insert(probe.clone(), quote).is_some() {
                bail!("live quotes row {n}: duplicate quote for {} at {}", probe.key, probe.weight);
            }
        }
        Ok(Self { quotes })
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[async_trait::async_trait]
impl CarrierQuoteClient for RecordedCarrier {
    async fn quote(&self, request: &ProbeRequest) -> Result<ExternalQuote, CarrierError> {
        let probe = Probe {
            key: request.probe.key.canonical(),
            ..request.probe.clone()
        };
        self.quotes.get(&probe).copied().ok_or(CarrierError::NoQuote)
    }
}
