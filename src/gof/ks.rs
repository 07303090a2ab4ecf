//! One-sample two-sided Kolmogorov–Smirnov test.

use crate::domain::GofStatistic;
use crate::math::{ks_pvalue, sorted};

/// Compare the empirical CDF of `values` against `cdf`.
///
/// `D = max(D+, D-)` where, for sorted `x_(i)`,
/// `D+ = max(i/n - F(x_(i)))` and `D- = max(F(x_(i)) - (i-1)/n)`.
pub fn ks_test<F>(values: &[f64], cdf: F) -> GofStatistic
where
    F: Fn(f64) -> f64,
{
    let xs = sorted(values);
    let n = xs.len();
    let n_f = n as f64;

    let mut d_plus = 0.0_f64;
    let mut d_minus = 0.0_f64;
    for (i, &x) in xs.iter().enumerate() {
        let f = cdf(x).clamp(0.0, 1.0);
        d_plus = d_plus.max((i + 1) as f64 / n_f - f);
        d_minus = d_minus.max(f - i as f64 / n_f);
    }

    let statistic = d_plus.max(d_minus);
    GofStatistic {
        statistic,
        p_value: ks_pvalue(n, statistic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_spread_sample_has_minimal_statistic() {
        // Midpoints of n equal bins under U(0,1): D = 1/(2n).
        let n = 20;
        let xs: Vec<f64> = (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect();
        let r = ks_test(&xs, |x| x.clamp(0.0, 1.0));
        assert!((r.statistic - 0.5 / n as f64).abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn shifted_sample_is_rejected() {
        let xs: Vec<f64> = (0..100).map(|i| 0.5 + 0.5 * i as f64 / 100.0).collect();
        let r = ks_test(&xs, |x| x.clamp(0.0, 1.0));
        assert!(r.statistic >= 0.5);
        assert!(r.p_value < 1e-10);
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let a = [0.9, 0.1, 0.5, 0.3, 0.7];
        let b = [0.1, 0.3, 0.5, 0.7, 0.9];
        let ra = ks_test(&a, |x| x);
        let rb = ks_test(&b, |x| x);
        assert_eq!(ra, rb);
    }
}
