//! Pearson chi-square goodness-of-fit on binned counts.
//!
//! Bins are built by the discrete families; this module only owns the
//! filtering rule and the statistic:
//!
//! - bins without a positive expected count are dropped
//! - `χ² = Σ (o - e)² / e` over the remaining bins
//! - `dof = bins - 1 - ddof` (ddof = number of estimated parameters accounted for)

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::domain::GofStatistic;
use crate::error::TestError;

/// Common rule of thumb for reliable chi-square bins.
pub const MIN_EXPECTED_COUNT: f64 = 5.0;

/// Observed/expected count pairs for a set of bins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bins {
    pub observed: Vec<f64>,
    pub expected: Vec<f64>,
}

impl Bins {
    pub fn push(&mut self, observed: f64, expected: f64) {
        self.observed.push(observed);
        self.expected.push(expected);
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Keep bins with a strictly positive expected count.
    pub fn drop_zero_expected(self) -> Self {
        self.retain(|e| e > 0.0)
    }

    fn retain<P: Fn(f64) -> bool>(self, keep: P) -> Self {
        let mut out = Bins::default();
        for (o, e) in self.observed.into_iter().zip(self.expected) {
            if e.is_finite() && keep(e) {
                out.push(o, e);
            }
        }
        out
    }
}

/// Pearson chi-square test on `bins` with `bins.len() - 1 - ddof` degrees of freedom.
///
/// Fails with `PreconditionViolation` when fewer than one degree of freedom
/// remains or a bin has no positive expectation.
pub fn chi_square_test(bins: &Bins, ddof: usize) -> Result<GofStatistic, TestError> {
    let k = bins.len();
    if k < 2 + ddof {
        return Err(TestError::precondition(format!(
            "chi-square test needs at least {} usable bins, found {k}",
            2 + ddof
        )));
    }
    if bins.expected.iter().any(|&e| !(e.is_finite() && e > 0.0)) {
        return Err(TestError::precondition(
            "chi-square bins must have positive expected counts",
        ));
    }

    let statistic: f64 = bins
        .observed
        .iter()
        .zip(bins.expected.iter())
        .map(|(o, e)| (o - e) * (o - e) / e)
        .sum();
    let dof = (k - 1 - ddof) as f64;

    Ok(GofStatistic {
        statistic,
        p_value: chi_square_sf(statistic, dof)?,
    })
}

/// Upper-tail probability of a chi-square variate.
pub fn chi_square_sf(statistic: f64, dof: f64) -> Result<f64, TestError> {
    let dist = ChiSquared::new(dof)
        .map_err(|e| TestError::fit(format!("invalid chi-square degrees of freedom {dof}: {e}")))?;
    Ok(dist.sf(statistic.max(0.0)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bins(observed: &[f64], expected: &[f64]) -> Bins {
        let mut b = Bins::default();
        for (&o, &e) in observed.iter().zip(expected) {
            b.push(o, e);
        }
        b
    }

    #[test]
    fn statistic_and_pvalue_for_three_bins() {
        let r = chi_square_test(&bins(&[10.0, 20.0, 30.0], &[20.0, 20.0, 20.0]), 0).unwrap();
        assert!((r.statistic - 10.0).abs() < 1e-12);
        // dof = 2 -> sf(x) = exp(-x/2)
        assert!((r.p_value - (-5.0_f64).exp()).abs() < 1e-10);
    }

    #[test]
    fn perfect_agreement_has_pvalue_one() {
        let r = chi_square_test(&bins(&[3.0, 5.0], &[3.0, 5.0]), 0).unwrap();
        assert!(r.statistic.abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn too_few_bins_is_a_precondition_violation() {
        let err = chi_square_test(&bins(&[8.0], &[8.0]), 0).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));

        let err = chi_square_test(&bins(&[4.0, 4.0], &[4.0, 4.0]), 1).unwrap_err();
        assert!(matches!(err, TestError::PreconditionViolation(_)));
    }

    #[test]
    fn filter_drops_empty_bins() {
        let kept = bins(&[1.0, 2.0, 3.0, 4.0], &[0.0, 2.0, 6.0, 12.0]).drop_zero_expected();
        assert_eq!(kept.observed, vec![2.0, 3.0, 4.0]);
        assert_eq!(kept.expected, vec![2.0, 6.0, 12.0]);
    }
}
