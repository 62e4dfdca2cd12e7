//! Fixed-precision primitives
//!
//! Quantities and crew sizes are kept at 4 decimals, money at 2 decimals.
//! Both functions work on the decimal value the caller wrote rather than on
//! its binary approximation: values sitting within floating-point noise of a
//! decimal boundary are treated as lying exactly on it.

/// Scale factor for quantity precision (4 decimals)
pub const QUANTITY_SCALE: f64 = 10_000.0;

/// Scale factor for money precision (2 decimals)
pub const MONEY_SCALE: f64 = 100.0;

/// Largest representation error tolerated on a scaled value
fn noise(scaled: f64) -> f64 {
    (scaled.abs() * 8.0 * f64::EPSILON).max(1e-9)
}

/// Truncate a quantity toward zero at 4 decimals.
///
/// `truncate4(0.123456) == 0.1234`, while `truncate4(8.0 * 3.0 / 2.0)` stays
/// `12.0` even when the product carries representation error.
pub fn truncate4(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let scaled = x * QUANTITY_SCALE;
    let nearest = scaled.round();
    let units = if (scaled - nearest).abs() <= noise(scaled) {
        nearest
    } else {
        scaled.trunc()
    };
    units / QUANTITY_SCALE
}

/// Round a money value to 2 decimals, half away from zero.
///
/// `round2(12.345) == 12.35` although `12.345 * 100.0` evaluates to
/// `1234.4999…` in binary floating point.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let scaled = x * MONEY_SCALE;
    let nudged = scaled + scaled.signum() * noise(scaled);
    nudged.round() / MONEY_SCALE
}

/// Whether two values differ by no more than `tolerance`
pub fn within(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
