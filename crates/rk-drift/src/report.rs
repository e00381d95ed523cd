use chrono::{DateTime, Utc};
use rk_money::{Micros, Percent};
use rk_tables::ListId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::Probe;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    Match,
    Warning,
    Error,
    /// No stored bracket covers the probe.
    Missing,
    /// The carrier failed or timed out. Recorded, never fatal.
    Unavailable,
}

impl SampleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleStatus::Match => "match",
            SampleStatus::Warning => "warning",
            SampleStatus::Error => "error",
            SampleStatus::Missing => "missing",
            SampleStatus::Unavailable => "unavailable",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    pub probe: Probe,
    pub status: SampleStatus,
    /// In the live quote's VAT mode once a live quote was obtained.
    pub stored_price: Option<Micros>,
    pub live_price: Option<Micros>,
    pub delta_pct: Option<Percent>,
    pub detail: Option<String>,
}

impl SampleResult {
    pub fn new(probe: Probe, status: SampleStatus) -> Self {
        Self {
            probe,
            status,
            stored_price: None,
            live_price: None,
            delta_pct: None,
            detail: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftSummary {
    pub total: usize,
    pub matched: usize,
    pub warning: usize,
    pub error: usize,
    pub missing: usize,
    pub unavailable: usize,
    pub max_delta_pct: Option<Percent>,
}

impl DriftSummary {
    pub fn from_samples(samples: &[SampleResult]) -> Self {
        let mut s = DriftSummary {
            total: samples.len(),
            ..DriftSummary::default()
        };
        for r in samples {
            match r.status {
                SampleStatus::Match => s.matched += 1,
                SampleStatus::Warning => s.warning += 1,
                SampleStatus::Error => s.error += 1,
                SampleStatus::Missing => s.missing += 1,
                SampleStatus::Unavailable => s.unavailable += 1,
            }
        }
        s.max_delta_pct = samples.iter().filter_map(|r| r.delta_pct).max();
        s
    }

    pub fn has_errors(&self) -> bool {
        self.error > 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub run_id: Uuid,
    pub list_id: ListId,
    pub generated_at: DateTime<Utc>,
    pub summary: DriftSummary,
    /// Same order as the plan.
    pub samples: Vec<SampleResult>,
}

impl DriftReport {
    pub fn new(list_id: ListId, samples: Vec<SampleResult>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            list_id,
            generated_at: Utc::now(),
            summary: DriftSummary::from_samples(&samples),
            samples,
        }
    }
}
