//! rk-drift
//!
//! Drift Validator: compares stored list prices against live carrier quotes
//! to catch configuration drift.
//!
//! Samples run with bounded concurrency; a sample whose carrier call fails
//! is recorded as `Unavailable` and the rest of the batch carries on.
//! Ops/test tooling only, never on the quote path.

mod client;
mod plan;
mod report;
mod validator;

pub use client::{CarrierError, CarrierQuoteClient, ExternalQuote, Probe, ProbeRequest};
pub use plan::DriftPlan;
pub use report::{DriftReport, DriftSummary, SampleResult, SampleStatus};
pub use validator::{DriftError, DriftSettings, DriftValidator};
