//! Scenario: drift samples are classified and a failing carrier never aborts the batch.
//!
//! # Invariants under test
//!
//! 1. delta <= 1% is `Match`, <= 5% is `Warning`, above is `Error`.
//! 2. A probe with no stored bracket is `Missing` and the carrier is not called.
//! 3. A carrier error or timeout is `Unavailable`; later samples still run.
//! 4. A live price of zero only matches a stored price of zero.
//! 5. Stored prices are compared in the live quote's VAT mode.
//! 6. Samples come back in plan order, and no more than `concurrency` carrier
//!    calls are in flight at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rk_drift::*;
use rk_money::{Grams, Micros, Percent};
use rk_tables::*;
use rk_tax::VatMode;

#[derive(Clone)]
enum Reply {
    Price(Micros, VatMode),
    Fail,
    Hang,
}

#[derive(Default)]
struct FakeCarrier {
    replies: HashMap<Grams, Reply>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeCarrier {
    fn with(mut self, kg: i64, reply: Reply) -> Self {
        self.replies.insert(Grams::new(kg * 1_000), reply);
        self
    }
}

#[async_trait::async_trait]
impl CarrierQuoteClient for FakeCarrier {
    async fn quote(&self, request: &ProbeRequest) -> Result<ExternalQuote, CarrierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let reply = self.replies.get(&request.probe.weight).cloned();
        let out = match reply {
            Some(Reply::Price(amount, vat_mode)) => Ok(ExternalQuote { amount, vat_mode }),
            Some(Reply::Fail) | None => Err(CarrierError::Unavailable("503".into())),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Err(CarrierError::NoQuote)
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        out
    }
}

/// One bracket per kg up to `n` kg, each priced at 10.00.
fn list(n: i64) -> PriceList {
    PriceList {
        id: ListId::new("brt"),
        name: "BRT".into(),
        list_type: ListType::Supplier,
        courier_id: Some("brt".into()),
        default_margin_percent: None,
        default_margin_fixed: None,
        margin_mode: None,
        vat_mode: VatMode::Excluded,
        vat_rate: 22.0,
        status: ListStatus::Active,
        accessories: Accessories::default(),
        entries: (0..n)
            .map(|i| PriceListEntry {
                key: RateKey::Zone(ZONE_ITALIA.into()),
                service_type: ServiceType::Standard,
                weight_from: Grams::new(i * 1_000 + 1),
                weight_to: Grams::new((i + 1) * 1_000),
                base_price: Micros::from_cents(1_000),
                fuel_surcharge_percent: Percent::ZERO,
                island_surcharge: Micros::ZERO,
                restricted_zone_surcharge: Micros::ZERO,
                delivery_days: None,
            })
            .collect(),
    }
}

fn grid(kgs: &[i64]) -> DriftPlan {
    let weights: Vec<Grams> = kgs.iter().map(|kg| Grams::new(kg * 1_000)).collect();
    DriftPlan::grid(&[RateKey::Zone(ZONE_ITALIA.into())], &weights, ServiceType::Standard)
}

fn excl(cents: i64) -> Reply {
    Reply::Price(Micros::from_cents(cents), VatMode::Excluded)
}

fn validator(carrier: Arc<FakeCarrier>, concurrency: usize) -> DriftValidator {
    DriftValidator::new(
        carrier,
        DriftSettings {
            concurrency,
            quote_timeout: Duration::from_secs(2),
            ..DriftSettings::default()
        },
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn thresholds_classify_each_sample() {
    let carrier = Arc::new(
        FakeCarrier::default()
            .with(1, excl(1_000)) // 0%
            .with(2, excl(990)) // 1.01%
            .with(3, excl(960)) // 4.17%
            .with(4, excl(900)), // 11.1%
    );
    let report = validator(carrier, 2).validate(&list(5), &grid(&[1, 2, 3, 4])).await.unwrap();
    let statuses: Vec<_> = report.samples.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![SampleStatus::Match, SampleStatus::Warning, SampleStatus::Warning, SampleStatus::Error]
    );
    assert_eq!(report.samples[0].delta_pct, Some(Percent::ZERO));
    assert!(report.summary.has_errors());
}

#[tokio::test(start_paused = true)]
async fn exactly_one_percent_is_still_a_match() {
    let carrier = Arc::new(FakeCarrier::default().with(1, excl(1_010)));
    // |10.00 - 10.10| / 10.10 = 0.99%
    let report = validator(carrier, 1).validate(&list(1), &grid(&[1])).await.unwrap();
    assert_eq!(report.samples[0].status, SampleStatus::Match);
}

#[tokio::test(start_paused = true)]
async fn missing_brackets_skip_the_carrier() {
    let carrier = Arc::new(FakeCarrier::default().with(9, excl(1_000)));
    let report = validator(carrier.clone(), 1).validate(&list(2), &grid(&[9])).await.unwrap();
    assert_eq!(report.samples[0].status, SampleStatus::Missing);
    assert_eq!(carrier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn carrier_failures_and_timeouts_are_recorded_not_fatal() {
    let carrier = Arc::new(
        FakeCarrier::default()
            .with(1, Reply::Fail)
            .with(2, Reply::Hang)
            .with(3, excl(1_000)),
    );
    let report = validator(carrier, 1).validate(&list(3), &grid(&[1, 2, 3])).await.unwrap();
    assert_eq!(report.samples[0].status, SampleStatus::Unavailable);
    assert_eq!(report.samples[1].status, SampleStatus::Unavailable);
    assert!(report.samples[1].detail.as_deref().unwrap().contains("timed out"));
    assert_eq!(report.samples[2].status, SampleStatus::Match);
    assert_eq!(report.summary.unavailable, 2);
    assert!(!report.summary.has_errors());
}

#[tokio::test(start_paused = true)]
async fn zero_live_price_matches_only_zero_stored_price() {
    let carrier = Arc::new(FakeCarrier::default().with(1, excl(0)));
    let report = validator(carrier.clone(), 1).validate(&list(1), &grid(&[1])).await.unwrap();
    assert_eq!(report.samples[0].status, SampleStatus::Error);

    let mut free = list(1);
    free.entries[0].base_price = Micros::ZERO;
    let report = validator(carrier, 1).validate(&free, &grid(&[1])).await.unwrap();
    assert_eq!(report.samples[0].status, SampleStatus::Match);
}

#[tokio::test(start_paused = true)]
async fn stored_price_is_compared_in_the_live_vat_mode() {
    // 10.00 net is 12.20 gross at 22%.
    let carrier = Arc::new(FakeCarrier::default().with(1, Reply::Price(Micros::from_cents(1_220), VatMode::Included)));
    let report = validator(carrier, 1).validate(&list(1), &grid(&[1])).await.unwrap();
    assert_eq!(report.samples[0].status, SampleStatus::Match);
    assert_eq!(report.samples[0].stored_price, Some(Micros::from_cents(1_220)));
}

#[tokio::test(start_paused = true)]
async fn order_is_kept_and_concurrency_is_bounded() {
    let kgs: Vec<i64> = (1..=12).collect();
    let mut carrier = FakeCarrier::default();
    for kg in &kgs {
        carrier = carrier.with(*kg, excl(1_000));
    }
    let carrier = Arc::new(carrier);
    let report = validator(carrier.clone(), 3).validate(&list(12), &grid(&kgs)).await.unwrap();

    let weights: Vec<Grams> = report.samples.iter().map(|s| s.probe.weight).collect();
    let expected: Vec<Grams> = kgs.iter().map(|kg| Grams::new(kg * 1_000)).collect();
    assert_eq!(weights, expected);
    assert_eq!(carrier.calls.load(Ordering::SeqCst), 12);
    assert!(carrier.max_in_flight.load(Ordering::SeqCst) <= 3);
}

#[tokio::test]
async fn invalid_settings_and_lists_are_refused() {
    let carrier = Arc::new(FakeCarrier::default());
    let bad = DriftSettings {
        concurrency: 0,
        ..DriftSettings::default()
    };
    assert!(matches!(
        DriftValidator::new(carrier.clone(), bad),
        Err(DriftError::InvalidSettings(_))
    ));

    let mut l = list(1);
    l.vat_rate = f64::NAN;
    let err = validator(carrier, 1).validate(&l, &grid(&[1])).await.unwrap_err();
    assert!(matches!(err, DriftError::InvalidList { .. }));
}
