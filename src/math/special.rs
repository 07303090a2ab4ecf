//! Special functions not provided by `statrs`.
//!
//! `statrs` covers ln Γ, ψ (digamma) and ln B; the gamma-shape Newton step
//! also needs the trigamma function ψ'.

/// Below this argument we shift upward with the recurrence before using the
/// asymptotic series.
const TRIGAMMA_SHIFT: f64 = 20.0;

/// Trigamma function `ψ'(x)` for `x > 0`.
///
/// Uses `ψ'(x) = ψ'(x + 1) + 1/x²` to move `x` above `TRIGAMMA_SHIFT`, then
/// the asymptotic expansion
/// `1/x + 1/(2x²) + 1/(6x³) − 1/(30x⁵) + 1/(42x⁷) − 1/(30x⁹)`.
pub fn trigamma(x: f64) -> f64 {
    if !(x.is_finite() && x > 0.0) {
        return f64::NAN;
    }

    let mut x = x;
    let mut acc = 0.0;
    while x < TRIGAMMA_SHIFT {
        acc += 1.0 / (x * x);
        x += 1.0;
    }

    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let series = inv
        + inv2 / 2.0
        + inv * inv2 * (1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 / 30.0)));
    acc + series
}
