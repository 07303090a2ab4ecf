//! Estimators for the count families.
//!
//! Every estimator first checks the support of the sample; values outside it
//! are a `PreconditionViolation`, never a silently degenerate statistic.

use crate::domain::FittedParameters;
use crate::error::TestError;
use crate::math::mean;

/// Tolerance for treating a float as an integer count.
pub const INTEGER_TOLERANCE: f64 = 1e-9;

/// Validate that every value is an integer `>= min` (and `<= max` when given)
/// and return the values as counts.
pub fn integer_counts(
    values: &[f64],
    family: &str,
    min: u64,
    max: Option<u64>,
) -> Result<Vec<u64>, TestError> {
    let mut out = Vec::with_capacity(values.len());
    for &v in values {
        let r = v.round();
        if (v - r).abs() > INTEGER_TOLERANCE {
            return Err(TestError::precondition(format!(
                "{family} requires integer values, found {v}"
            )));
        }
        if r < min as f64 || max.is_some_and(|m| r > m as f64) {
            let upper = max.map_or_else(|| "inf".to_string(), |m| m.to_string());
            return Err(TestError::precondition(format!(
                "{family} requires values in [{min}, {upper}], found {v}"
            )));
        }
        out.push(r as u64);
    }
    Ok(out)
}

/// Bernoulli: `p = mean`, values restricted to `{0, 1}`.
pub fn fit_bernoulli(values: &[f64]) -> Result<FittedParameters, TestError> {
    integer_counts(values, "bernoulli", 0, Some(1))?;
    Ok(FittedParameters::Bernoulli { p: mean(values) })
}

/// Binomial with the trial count taken to be the sample size: `p = mean / n`.
pub fn fit_binomial(values: &[f64]) -> Result<FittedParameters, TestError> {
    let n = values.len() as u64;
    integer_counts(values, "binomial", 0, Some(n))?;
    Ok(FittedParameters::Binomial {
        n,
        p: mean(values) / n as f64,
    })
}

/// Geometric on `{1, 2, ...}`: `p = 1 / mean`.
pub fn fit_geometric(values: &[f64]) -> Result<FittedParameters, TestError> {
    integer_counts(values, "geometric", 1, None)?;
    Ok(FittedParameters::Geometric {
        p: 1.0 / mean(values),
    })
}

/// Poisson: `lambda = mean`, which must be positive.
pub fn fit_poisson(values: &[f64]) -> Result<FittedParameters, TestError> {
    integer_counts(values, "poisson", 0, None)?;
    let lambda = mean(values);
    if !(lambda > 0.0) {
        return Err(TestError::precondition(
            "poisson requires a positive sample mean",
        ));
    }
    Ok(FittedParameters::Poisson { lambda })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_precondition(r: Result<FittedParameters, TestError>) -> bool {
        matches!(r, Err(TestError::PreconditionViolation(_)))
    }

    #[test]
    fn bernoulli_estimates_success_rate() {
        let xs = [1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        assert_eq!(
            fit_bernoulli(&xs).unwrap(),
            FittedParameters::Bernoulli { p: 0.625 }
        );
        assert!(is_precondition(fit_bernoulli(&[0.0, 2.0])));
        assert!(is_precondition(fit_bernoulli(&[0.5, 1.0])));
    }

    #[test]
    fn binomial_uses_sample_size_as_trials() {
        let xs = [1.0, 2.0, 3.0, 2.0];
        assert_eq!(
            fit_binomial(&xs).unwrap(),
            FittedParameters::Binomial { n: 4, p: 0.5 }
        );
        assert!(is_precondition(fit_binomial(&[1.0, 5.0])));
        assert!(is_precondition(fit_binomial(&[-1.0, 1.0])));
    }

    #[test]
    fn geometric_support_starts_at_one() {
        assert_eq!(
            fit_geometric(&[1.0, 2.0, 3.0, 2.0]).unwrap(),
            FittedParameters::Geometric { p: 0.5 }
        );
        assert!(is_precondition(fit_geometric(&[0.0, 1.0])));
    }

    #[test]
    fn poisson_rejects_all_zero_and_fractional() {
        assert_eq!(
            fit_poisson(&[0.0, 2.0, 4.0]).unwrap(),
            FittedParameters::Poisson { lambda: 2.0 }
        );
        assert!(is_precondition(fit_poisson(&[0.0, 0.0])));
        assert!(is_precondition(fit_poisson(&[1.5, 2.0])));
    }

    #[test]
    fn integer_counts_tolerates_rounding_noise() {
        let counts = integer_counts(&[3.0 + 1e-12, 4.0], "poisson", 0, None).unwrap();
        assert_eq!(counts, vec![3, 4]);
    }
}
