//! Goodness-of-fit adapters: one test function per family.
//!
//! Each adapter receives the raw sample and the parameters produced by the
//! family's estimator and returns the test statistic with its p-value.
//! Continuous families build a fitted CDF for the KS test; count families
//! build observed/expected bins for the chi-square test.

use std::collections::BTreeMap;

use statrs::distribution::{
    Beta, Binomial, ChiSquared, ContinuousCDF, Discrete, Exp, Gamma, Geometric, LogNormal,
    Poisson, StudentsT, Weibull,
};

use crate::domain::{FittedParameters, GofStatistic};
use crate::error::TestError;
use crate::fit::{integer_counts, normalize_unit};
use crate::gof::{Bins, MIN_EXPECTED_COUNT, chi_square_test, ks_test, normality_test};

fn mismatch(family: &str, params: &FittedParameters) -> TestError {
    TestError::fit(format!(
        "{family} test received parameters for another family: {}",
        params.summary()
    ))
}

fn invalid(family: &str, e: impl std::fmt::Display) -> TestError {
    TestError::fit(format!("invalid fitted {family} parameters: {e}"))
}

pub fn test_normal(values: &[f64], _params: &FittedParameters) -> Result<GofStatistic, TestError> {
    normality_test(values)
}

pub fn test_student_t(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::StudentT { df, loc, scale } = *params else {
        return Err(mismatch("t", params));
    };
    let dist = StudentsT::new(loc, scale, df).map_err(|e| invalid("t", e))?;
    Ok(ks_test(values, |x| dist.cdf(x)))
}

pub fn test_lognormal(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::LogNormal { shape, loc, scale } = *params else {
        return Err(mismatch("lognorm", params));
    };
    let dist = LogNormal::new(scale.ln(), shape).map_err(|e| invalid("lognorm", e))?;
    Ok(ks_test(values, |x| {
        let y = x - loc;
        if y > 0.0 { dist.cdf(y) } else { 0.0 }
    }))
}

pub fn test_chi_squared(
    values: &[f64],
    params: &FittedParameters,
) -> Result<GofStatistic, TestError> {
    let FittedParameters::ChiSquared { df, loc, scale } = *params else {
        return Err(mismatch("chi2", params));
    };
    let dist = ChiSquared::new(df).map_err(|e| invalid("chi2", e))?;
    Ok(ks_test(values, |x| {
        let y = (x - loc) / scale;
        if y > 0.0 { dist.cdf(y) } else { 0.0 }
    }))
}

pub fn test_gamma(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::Gamma { shape, loc, scale } = *params else {
        return Err(mismatch("gamma", params));
    };
    // statrs parameterizes by rate; work on the standardized variable.
    let dist = Gamma::new(shape, 1.0).map_err(|e| invalid("gamma", e))?;
    Ok(ks_test(values, |x| {
        let y = (x - loc) / scale;
        if y > 0.0 { dist.cdf(y) } else { 0.0 }
    }))
}

pub fn test_beta(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::Beta { a, b, min, max } = *params else {
        return Err(mismatch("beta", params));
    };
    let dist = Beta::new(a, b).map_err(|e| invalid("beta", e))?;
    if !(max > min) {
        return Err(invalid("beta", format!("empty range [{min}, {max}]")));
    }
    let unit: Vec<f64> = values.iter().map(|x| (x - min) / (max - min)).collect();
    Ok(ks_test(&unit, |x| dist.cdf(x.clamp(0.0, 1.0))))
}

pub fn test_weibull(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::Weibull { shape, loc, scale } = *params else {
        return Err(mismatch("weibull", params));
    };
    let dist = Weibull::new(shape, scale).map_err(|e| invalid("weibull", e))?;
    Ok(ks_test(values, |x| {
        let y = x - loc;
        if y > 0.0 { dist.cdf(y) } else { 0.0 }
    }))
}

pub fn test_exponential(
    values: &[f64],
    params: &FittedParameters,
) -> Result<GofStatistic, TestError> {
    let FittedParameters::Exponential { scale } = *params else {
        return Err(mismatch("exponential", params));
    };
    let dist = Exp::new(1.0 / scale).map_err(|e| invalid("exponential", e))?;
    Ok(ks_test(values, |x| dist.cdf(x)))
}

pub fn test_uniform(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    if !matches!(params, FittedParameters::Uniform { .. }) {
        return Err(mismatch("uniform", params));
    }
    let (unit, _, _) = normalize_unit(values)?;
    Ok(ks_test(&unit, |x| x.clamp(0.0, 1.0)))
}

/// Observed frequency of each integer value.
fn tally(counts: &[u64]) -> BTreeMap<u64, f64> {
    let mut out = BTreeMap::new();
    for &k in counts {
        *out.entry(k).or_insert(0.0) += 1.0;
    }
    out
}

pub fn test_bernoulli(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::Bernoulli { p } = *params else {
        return Err(mismatch("bernoulli", params));
    };
    let counts = integer_counts(values, "bernoulli", 0, Some(1))?;
    let n = counts.len() as f64;
    let ones = counts.iter().filter(|&&k| k == 1).count() as f64;

    let mut bins = Bins::default();
    bins.push(n - ones, n * (1.0 - p));
    bins.push(ones, n * p);
    chi_square_test(&bins.drop_zero_expected(), 0)
}

pub fn test_binomial(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::Binomial { n: trials, p } = *params else {
        return Err(mismatch("binomial", params));
    };
    let dist = Binomial::new(p, trials).map_err(|e| invalid("binomial", e))?;
    let counts = integer_counts(values, "binomial", 0, Some(trials))?;
    let size = counts.len() as f64;
    let observed = tally(&counts);

    let mut bins = Bins::default();
    for k in 0..=trials {
        let o = observed.get(&k).copied().unwrap_or(0.0);
        bins.push(o, size * dist.pmf(k));
    }
    chi_square_test(&bins.drop_zero_expected(), 0)
}

pub fn test_geometric(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::Geometric { p } = *params else {
        return Err(mismatch("geometric", params));
    };
    let dist = Geometric::new(p).map_err(|e| invalid("geometric", e))?;
    let counts = integer_counts(values, "geometric", 1, None)?;
    let size = counts.len() as f64;
    let max = counts.iter().copied().max().unwrap_or(1);
    let observed = tally(&counts);

    // The pmf decreases from k = 1, so the first sparse bin ends the table.
    let mut bins = Bins::default();
    for k in 1..=max {
        let expected = size * dist.pmf(k);
        if !(expected >= MIN_EXPECTED_COUNT) {
            break;
        }
        bins.push(observed.get(&k).copied().unwrap_or(0.0), expected);
    }
    chi_square_test(&bins, 0)
}

/// Chi-square over the distinct observed values; one extra degree of freedom
/// is removed for the estimated rate.
pub fn test_poisson(values: &[f64], params: &FittedParameters) -> Result<GofStatistic, TestError> {
    let FittedParameters::Poisson { lambda } = *params else {
        return Err(mismatch("poisson", params));
    };
    let dist = Poisson::new(lambda).map_err(|e| invalid("poisson", e))?;
    let counts = integer_counts(values, "poisson", 0, None)?;
    let size = counts.len() as f64;

    let mut bins = Bins::default();
    for (k, o) in tally(&counts) {
        bins.push(o, size * dist.pmf(k));
    }
    chi_square_test(&bins.drop_zero_expected(), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bernoulli_scenario_matches_expected_counts() {
        let xs = [1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        let r = test_bernoulli(&xs, &FittedParameters::Bernoulli { p: 0.625 }).unwrap();
        assert!(r.statistic.abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_bernoulli_has_too_few_bins() {
        let err = test_bernoulli(&[1.0; 6], &FittedParameters::Bernoulli { p: 1.0 }).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));
    }

    #[test]
    fn uniform_grid_is_accepted() {
        let xs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let params = FittedParameters::Uniform { min: 0.0, max: 49.0 };
        let r = test_uniform(&xs, &params).unwrap();
        assert!(r.p_value > 0.99, "p={}", r.p_value);
    }

    #[test]
    fn poisson_dof_accounts_for_estimated_rate() {
        // Three distinct values -> one degree of freedom.
        let xs = [0.0, 1.0, 1.0, 2.0];
        let r = test_poisson(&xs, &FittedParameters::Poisson { lambda: 1.0 }).unwrap();
        assert!((0.0..=1.0).contains(&r.p_value));

        let err =
            test_poisson(&[1.0, 2.0], &FittedParameters::Poisson { lambda: 1.5 }).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));
    }

    #[test]
    fn binomial_bins_cover_every_trial_count() {
        // Expected (n = 4, p = 0.5, trials = 2): 1, 2, 1; observed: 2, 1, 1.
        let xs = [0.0, 0.0, 1.0, 2.0];
        let r = test_binomial(&xs, &FittedParameters::Binomial { n: 2, p: 0.5 }).unwrap();
        assert!((r.statistic - 1.5).abs() < 1e-12);
        // dof = 2 -> sf(x) = exp(-x/2)
        assert!((r.p_value - (-0.75_f64).exp()).abs() < 1e-10);
    }

    #[test]
    fn binomial_drops_impossible_counts() {
        // p = 1 leaves a single bin with positive expectation.
        let err = test_binomial(&[2.0, 2.0, 2.0], &FittedParameters::Binomial { n: 2, p: 1.0 })
            .unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));
    }

    #[test]
    fn geometric_keeps_bins_with_enough_expectation() {
        // n = 48, p = 0.5: expected 24, 12, 6, 3, ...; the table stops at k = 3.
        let mut xs = vec![1.0; 25];
        xs.extend([2.0; 12]);
        xs.extend([3.0; 5]);
        xs.extend([7.0; 6]);
        let r = test_geometric(&xs, &FittedParameters::Geometric { p: 0.5 }).unwrap();
        let expected_stat = 1.0 / 24.0 + 1.0 / 6.0;
        assert!((r.statistic - expected_stat).abs() < 1e-9, "stat={}", r.statistic);
        assert!((r.p_value - (-expected_stat / 2.0).exp()).abs() < 1e-9);
    }

    #[test]
    fn geometric_with_huge_count_finishes() {
        let xs = [1.0, 1.0, 2.0, 3.0, 1e12];
        let p = 1.0 / (7.0 + 1e12) * 5.0;
        let err = test_geometric(&xs, &FittedParameters::Geometric { p }).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));

        let err = test_geometric(&[1.0, 1e30], &FittedParameters::Geometric { p: 0.5 }).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));
    }

    #[test]
    fn beta_ks_runs_on_min_max_normalized_values() {
        // Beta(1, 1) is uniform: the endpoints 0 and 1 give D = 1/5.
        let xs = [10.0, 12.5, 15.0, 17.5, 20.0];
        let params = FittedParameters::Beta { a: 1.0, b: 1.0, min: 10.0, max: 20.0 };
        let r = test_beta(&xs, &params).unwrap();
        assert!((r.statistic - 0.2).abs() < 1e-12, "stat={}", r.statistic);
    }

    #[test]
    fn mismatched_parameters_are_rejected() {
        let err = test_gamma(&[1.0, 2.0], &FittedParameters::Poisson { lambda: 1.0 }).unwrap_err();
        assert!(matches!(err, TestError::FitFailure(_)));
    }

    #[test]
    fn exponential_cdf_is_used_with_rate() {
        // Quantile midpoints of Exp(scale = 2).
        let n = 40;
        let xs: Vec<f64> = (0..n)
            .map(|i| -2.0 * (1.0 - (i as f64 + 0.5) / n as f64).ln())
            .collect();
        let r = test_exponential(&xs, &FittedParameters::Exponential { scale: 2.0 }).unwrap();
        assert!((r.statistic - 0.5 / n as f64).abs() < 1e-9);
    }
}
