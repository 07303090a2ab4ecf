//! Distribution of the two-sided Kolmogorov–Smirnov statistic `D_n`.
//!
//! For `n <= EXACT_MAX_N` we use the Marsaglia–Tsang–Wang (2003) matrix
//! method, which evaluates `P(D_n < d)` as an entry of `H^n` for a small
//! `(2k-1) × (2k-1)` matrix `H`, `k = ⌊n d⌋ + 1`. Entries of `H^n` overflow
//! quickly, so the matrix power keeps a separate base-10 exponent.
//!
//! For larger samples we use the Kolmogorov limiting distribution with
//! Stephens' finite-sample correction `λ = (√n + 0.12 + 0.11/√n) d`.

use nalgebra::DMatrix;

/// Largest sample size evaluated with the exact matrix method.
pub const EXACT_MAX_N: usize = 10_000;

/// Rescaling threshold for the matrix power (and its decimal exponent step).
const SCALE_LIMIT: f64 = 1e140;
const SCALE_EXP: i32 = 140;

/// Two-sided p-value `P(D_n >= d)`.
pub fn ks_pvalue(n: usize, d: f64) -> f64 {
    if n == 0 || d.is_nan() {
        return f64::NAN;
    }
    if d <= 0.0 {
        return 1.0;
    }
    if d >= 1.0 {
        return 0.0;
    }
    // D_n >= 1/(2n) for every sample.
    if n as f64 * d <= 0.5 {
        return 1.0;
    }

    let p = if n <= EXACT_MAX_N {
        1.0 - exact_cdf(n, d)
    } else {
        kolmogorov_sf((n as f64).sqrt() * d + correction(n) * d)
    };
    p.clamp(0.0, 1.0)
}

fn correction(n: usize) -> f64 {
    let sqrt_n = (n as f64).sqrt();
    0.12 + 0.11 / sqrt_n
}

/// `P(D_n < d)` via Marsaglia–Tsang–Wang.
fn exact_cdf(n: usize, d: f64) -> f64 {
    let n_f = n as f64;
    let s = d * d * n_f;

    // Far right tail: closed-form approximation from the same paper.
    if s > 7.24 || (s > 3.76 && n > 99) {
        return 1.0 - 2.0 * (-(2.000071 + 0.331 / n_f.sqrt() + 1.409 / n_f) * s).exp();
    }

    let k = (n_f * d) as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - n_f * d;

    let mut hm = DMatrix::<f64>::from_fn(m, m, |i, j| if i + 1 >= j { 1.0 } else { 0.0 });
    for i in 0..m {
        hm[(i, 0)] -= h.powi(i as i32 + 1);
        hm[(m - 1, i)] -= h.powi((m - i) as i32);
    }
    let corner = 2.0 * h - 1.0;
    if corner > 0.0 {
        hm[(m - 1, 0)] += corner.powi(m as i32);
    }
    for i in 0..m {
        for j in 0..m {
            if i + 1 > j {
                for g in 1..=(i + 1 - j) {
                    hm[(i, j)] /= g as f64;
                }
            }
        }
    }

    let (q, mut exponent) = matrix_power(&hm, n);
    let mut s = q[(k - 1, k - 1)].max(0.0);
    for i in 1..=n {
        s = s * i as f64 / n_f;
        if s < 1.0 / SCALE_LIMIT {
            s *= SCALE_LIMIT;
            exponent -= SCALE_EXP;
        }
    }
    s * 10f64.powi(exponent)
}

/// `A^n` as `(matrix, decimal exponent)`.
fn matrix_power(a: &DMatrix<f64>, n: usize) -> (DMatrix<f64>, i32) {
    if n == 1 {
        return (a.clone(), 0);
    }
    let (half, half_exp) = matrix_power(a, n / 2);
    let squared = &half * &half;
    let (mut v, mut exponent) = if n % 2 == 0 {
        (squared, 2 * half_exp)
    } else {
        (a * &squared, 2 * half_exp)
    };

    let center = v.nrows() / 2;
    if v[(center, center)] > SCALE_LIMIT {
        v /= SCALE_LIMIT;
        exponent += SCALE_EXP;
    }
    (v, exponent)
}

/// Survival function of the Kolmogorov distribution, `P(K > λ)`.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }

    if lambda < 1.18 {
        // Small-λ form: P(K <= λ) = √(2π)/λ · Σ exp(-(2j-1)² π² / (8 λ²)).
        let w = std::f64::consts::PI * std::f64::consts::PI / (8.0 * lambda * lambda);
        let mut cdf = 0.0;
        for j in 1..=20 {
            let odd = (2 * j - 1) as f64;
            cdf += (-odd * odd * w).exp();
        }
        cdf *= (2.0 * std::f64::consts::PI).sqrt() / lambda;
        return (1.0 - cdf).clamp(0.0, 1.0);
    }

    // Large-λ form: 2 Σ (-1)^{j-1} exp(-2 j² λ²).
    let mut sf = 0.0;
    let mut sign = 1.0;
    for j in 1..=100 {
        let j = j as f64;
        let term = (-2.0 * j * j * lambda * lambda).exp();
        sf += sign * term;
        if term < 1e-16 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sf).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_observation_has_closed_form() {
        // For n = 1, D = max(F, 1 - F) and P(D >= d) = 2(1 - d) on [0.5, 1].
        for &d in &[0.55, 0.6, 0.75, 0.9] {
            let p = ks_pvalue(1, d);
            assert!((p - 2.0 * (1.0 - d)).abs() < 1e-12, "d={d} p={p}");
        }
    }

    #[test]
    fn statistic_below_minimum_has_pvalue_one() {
        // D_n >= 1/(2n) always.
        assert!((ks_pvalue(10, 0.04) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn boundaries() {
        assert_eq!(ks_pvalue(20, 0.0), 1.0);
        assert_eq!(ks_pvalue(20, 1.0), 0.0);
        assert!(ks_pvalue(0, 0.5).is_nan());
    }

    #[test]
    fn exact_matches_asymptotic_for_moderate_n() {
        let n = 2000;
        let d = 0.025;
        let exact = ks_pvalue(n, d);
        let asym = kolmogorov_sf(((n as f64).sqrt() + correction(n)) * d);
        assert!((exact - asym).abs() < 0.01, "exact={exact} asym={asym}");
    }

    #[test]
    fn pvalue_decreases_with_statistic() {
        let n = 50;
        let mut prev = 1.0;
        for i in 1..20 {
            let d = i as f64 * 0.02;
            let p = ks_pvalue(n, d);
            assert!(p <= prev + 1e-12, "non-monotone at d={d}");
            prev = p;
        }
        assert!(prev < 1e-5);
    }

    #[test]
    fn kolmogorov_series_branches_agree() {
        let below = kolmogorov_sf(1.18 - 1e-9);
        let above = kolmogorov_sf(1.18 + 1e-9);
        assert!((below - above).abs() < 1e-8);
        // Known quantile: P(K > 1.3581) ≈ 0.05.
        assert!((kolmogorov_sf(1.3581) - 0.05).abs() < 1e-3);
    }
}
