//! Scenario: fixed-point money across a full quote computation.
//!
//! # Invariants under test
//!
//! 1. Summing cent-rounded parts and rounding the sum agree when every part
//!    is already whole cents; no float drift accumulates over many lines.
//! 2. Rounding is applied once: rounding the unrounded total can differ from
//!    summing rounded parts, and the engine's convention is the former.
//! 3. Wire values survive `f64 -> Micros -> f64` exactly at cent precision.
//! 4. Serde goes through the same guards as `from_f64`.
//! 5. Weights compare exactly in grams; kg on the wire.

use rk_money::{ConversionError, Grams, Micros, Percent};

#[test]
fn many_cent_amounts_sum_without_drift() {
    // 0.10 added a thousand times is exactly 100.00; in f64 it is not.
    let total: Micros = std::iter::repeat(Micros::from_cents(10)).take(1_000).sum();
    assert_eq!(total, Micros::from_cents(10_000));

    let float_total: f64 = std::iter::repeat(0.10_f64).take(1_000).sum();
    assert_ne!(float_total, 100.0);
}

#[test]
fn rounding_once_at_the_end() {
    // Three lines of 1.005 each: rounding per line gives 3.03, rounding the
    // total (3.015) gives 3.02.
    let line = Micros::new(1_005_000);
    let per_line: Micros = [line, line, line].iter().map(|m| m.round_cents()).sum();
    let once = (line + line + line).round_cents();
    assert_eq!(per_line, Micros::from_cents(303));
    assert_eq!(once, Micros::from_cents(302));
}

#[test]
fn fuel_surcharge_on_a_base_price() {
    // 6.20 with 10% fuel: 6.82.
    let fuel = Percent::points(10);
    assert_eq!(Micros::from_cents(620).grow_by(fuel), Some(Micros::from_cents(682)));
    // 7.33 with 12.5% fuel: 8.24625 -> 8.25.
    let fuel = Percent::from_f64(12.5).unwrap();
    let total = Micros::from_cents(733).grow_by(fuel).unwrap();
    assert_eq!(total, Micros::new(8_246_250));
    assert_eq!(total.round_cents(), Micros::from_cents(825));
}

#[test]
fn cent_values_round_trip_through_f64() {
    for cents in [0_i64, 1, 99, 440, 537, 123_456_789] {
        let m = Micros::from_cents(cents);
        assert_eq!(Micros::from_f64(m.to_f64()).unwrap(), m, "{cents}");
    }
}

#[test]
fn serde_applies_the_same_guards() {
    let m: Micros = serde_json::from_str("4.4").unwrap();
    assert_eq!(m, Micros::from_cents(440));
    assert_eq!(serde_json::to_string(&m).unwrap(), "4.4");

    assert!(serde_json::from_str::<Micros>("1e300").is_err());
    assert!(serde_json::from_str::<Grams>("-0.5").is_err());
    assert_eq!(Grams::from_kg(-0.5), Err(ConversionError::Negative));
}

#[test]
fn weights_compare_in_whole_grams() {
    // 2.0625 kg is 2062.5 g exactly; half rounds up.
    let w = Grams::from_kg(2.0625).unwrap();
    assert_eq!(w, Grams::new(2_063));
    assert!(w > Grams::from_kg(2.0).unwrap());
    assert_eq!(Grams::new(1_500).to_string(), "1.5kg");
}

#[test]
fn ratio_of_a_drift() {
    // |4.40 - 4.62| / 4.62 = 4.7619..%
    let delta = Micros::from_cents(22).ratio_percent(Micros::from_cents(462)).unwrap();
    assert!(delta > Percent::points(4) && delta < Percent::points(5));
    assert_eq!(Micros::from_cents(1).ratio_percent(Micros::ZERO), None);
}
