//! D'Agostino–Pearson omnibus normality test.
//!
//! Combines a skewness z-score (D'Agostino 1970) and a kurtosis z-score
//! (Anscombe & Glynn 1983) into `K² = Z_s² + Z_k²`, which is approximately
//! χ² with 2 degrees of freedom under normality.

use crate::domain::GofStatistic;
use crate::error::TestError;
use crate::gof::chisquare::chi_square_sf;
use crate::math::Moments;

/// The skewness transform is only defined from 8 observations on.
pub const MIN_NORMALITY_N: usize = 8;

pub fn normality_test(values: &[f64]) -> Result<GofStatistic, TestError> {
    let n = values.len();
    if n < MIN_NORMALITY_N {
        return Err(TestError::precondition(format!(
            "normality test needs at least {MIN_NORMALITY_N} observations, got {n}"
        )));
    }
    let moments =
        Moments::of(values).ok_or_else(|| TestError::precondition("sample has no values"))?;
    if !(moments.m2 > 0.0) {
        return Err(TestError::precondition("sample has zero variance"));
    }

    let z_skew = skew_z(moments.skewness(), n as f64);
    let z_kurt = kurtosis_z(moments.kurtosis(), n as f64);
    let statistic = z_skew * z_skew + z_kurt * z_kurt;
    if !statistic.is_finite() {
        return Err(TestError::fit("normality statistic is not finite"));
    }

    Ok(GofStatistic {
        statistic,
        p_value: chi_square_sf(statistic, 2.0)?,
    })
}

/// Skewness z-score.
fn skew_z(b1: f64, n: f64) -> f64 {
    let y = b1 * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = (3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0))
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    let ratio = y / alpha;
    delta * (ratio + (ratio * ratio + 1.0).sqrt()).ln()
}

/// Kurtosis z-score (`b2` is Pearson kurtosis, 3 under normality).
fn kurtosis_z(b2: f64, n: f64) -> f64 {
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 =
        24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / var_b2.sqrt();

    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * ((6.0 * (n + 3.0) * (n + 5.0)) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    let term2 = ((1.0 - 2.0 / a) / denom).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Exp, Normal};

    #[test]
    fn symmetric_sample_has_zero_skew_score() {
        assert_eq!(skew_z(0.0, 50.0), 0.0);
        assert!(skew_z(0.5, 50.0) > 0.0);
        assert!(skew_z(-0.5, 50.0) < 0.0);
    }

    #[test]
    fn normal_samples_mostly_pass() {
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(10.0, 2.0).unwrap();
        let mut passes = 0;
        for _ in 0..200 {
            let xs: Vec<f64> = (0..50).map(|_| normal.sample(&mut rng)).collect();
            let r = normality_test(&xs).unwrap();
            assert!((0.0..=1.0).contains(&r.p_value));
            if r.p_value > 0.05 {
                passes += 1;
            }
        }
        assert!(passes >= 180, "only {passes}/200 normal samples passed");
    }

    #[test]
    fn exponential_sample_is_rejected() {
        let mut rng = StdRng::seed_from_u64(11);
        let exp = Exp::new(1.0).unwrap();
        let xs: Vec<f64> = (0..500).map(|_| exp.sample(&mut rng)).collect();
        let r = normality_test(&xs).unwrap();
        assert!(r.p_value < 1e-6, "p={}", r.p_value);
    }

    #[test]
    fn degenerate_inputs_are_precondition_violations() {
        let err = normality_test(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));

        let err = normality_test(&[4.0; 20]).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));
    }
}
