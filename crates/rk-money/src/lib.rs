//! rk-money
//!
//! Fixed-point quantities shared by every pricing crate.
//!
//! - `Micros`: money at 1e-6 scale (`i64`). No floats inside the engine.
//! - `Percent`: a percentage at 1e-6 scale (15% = `Percent(15_000_000)`).
//! - `Grams`: shipment weight as whole grams.
//!
//! `f64` only appears at the wire boundary (`from_f64` / `to_f64`), and
//! every conversion into the fixed-point domain rejects NaN and infinities.
//! Pure logic, no IO.

mod fixedpoint;
mod percent;
mod weight;

pub use fixedpoint::{Micros, CENT_MICROS, MICROS_PER_UNIT};
pub use percent::{Percent, PERCENT_SCALE};
pub use weight::Grams;

/// Errors raised when an `f64` from the wire cannot enter the fixed-point domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Input was `NaN` or infinite.
    #[error("non-finite input (NaN or Inf)")]
    NotFinite,
    /// Input would overflow `i64` after scaling.
    #[error("value out of i64 range after scaling")]
    OutOfRange,
    /// Input was negative where only non-negative values are meaningful.
    #[error("negative value where a non-negative quantity is required")]
    Negative,
}

/// Scale an `f64` by `scale` and round half away from zero into an `i64`.
pub(crate) fn scale_f64(value: f64, scale: i64) -> Result<i64, ConversionError> {
    if !value.is_finite() {
        return Err(ConversionError::NotFinite);
    }
    let scaled = value * scale as f64;
    // f64 -> i64 casts saturate silently; reject instead.
    if scaled >= i64::MAX as f64 || scaled <= i64::MIN as f64 {
        return Err(ConversionError::OutOfRange);
    }
    Ok(scaled.round() as i64)
}

/// Integer division rounding half away from zero. `den` must be non-zero.
pub(crate) fn div_round_half_up(num: i128, den: i128) -> i128 {
    let q = num / den;
    let r = num % den;
    if 2 * r.abs() >= den.abs() {
        q + num.signum() * den.signum()
    } else {
        q
    }
}
