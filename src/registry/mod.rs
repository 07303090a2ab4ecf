//! Family registry: the immutable table behind the dispatcher.
//!
//! Each `FamilyId` maps to a `FamilySpec` holding its estimator, its test
//! adapter and the test method. The table is built once when a tester is
//! constructed and never mutated afterwards.

use std::collections::HashMap;

use crate::domain::{FamilyId, FittedParameters, GofStatistic, TestMethod};
use crate::error::TestError;
use crate::fit;

pub mod families;

pub type EstimateFn = fn(&[f64]) -> Result<FittedParameters, TestError>;
pub type TestFn = fn(&[f64], &FittedParameters) -> Result<GofStatistic, TestError>;

fn estimate_none(_values: &[f64]) -> Result<FittedParameters, TestError> {
    Ok(FittedParameters::Normal)
}

/// Estimation and testing strategy for one family.
#[derive(Clone, Copy)]
pub struct FamilySpec {
    pub id: FamilyId,
    pub method: TestMethod,
    pub estimate: EstimateFn,
    pub test: TestFn,
}

impl FamilySpec {
    const fn new(id: FamilyId, method: TestMethod, estimate: EstimateFn, test: TestFn) -> Self {
        Self {
            id,
            method,
            estimate,
            test,
        }
    }

    /// Estimate parameters, then run the goodness-of-fit test against them.
    pub fn run(&self, values: &[f64]) -> Result<(FittedParameters, GofStatistic), TestError> {
        let params = (self.estimate)(values)?;
        let stat = (self.test)(values, &params)?;
        Ok((params, stat))
    }
}

impl std::fmt::Debug for FamilySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FamilySpec")
            .field("id", &self.id)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct FamilyRegistry {
    specs: HashMap<FamilyId, FamilySpec>,
}

impl FamilyRegistry {
    /// Registry with every supported family.
    pub fn standard() -> Self {
        use TestMethod::{ChiSquare, KolmogorovSmirnov, Normality};
        use families::*;

        let table = [
            FamilySpec::new(FamilyId::Normal, Normality, estimate_none, test_normal),
            FamilySpec::new(
                FamilyId::StudentT,
                KolmogorovSmirnov,
                fit::fit_student_t,
                test_student_t,
            ),
            FamilySpec::new(
                FamilyId::LogNormal,
                KolmogorovSmirnov,
                fit::fit_lognormal,
                test_lognormal,
            ),
            FamilySpec::new(
                FamilyId::ChiSquared,
                KolmogorovSmirnov,
                fit::fit_chi_squared,
                test_chi_squared,
            ),
            FamilySpec::new(FamilyId::Gamma, KolmogorovSmirnov, fit::fit_gamma, test_gamma),
            FamilySpec::new(FamilyId::Beta, KolmogorovSmirnov, fit::fit_beta, test_beta),
            FamilySpec::new(
                FamilyId::Weibull,
                KolmogorovSmirnov,
                fit::fit_weibull,
                test_weibull,
            ),
            FamilySpec::new(
                FamilyId::Exponential,
                KolmogorovSmirnov,
                fit::fit_exponential,
                test_exponential,
            ),
            FamilySpec::new(
                FamilyId::Uniform,
                KolmogorovSmirnov,
                fit::fit_uniform,
                test_uniform,
            ),
            FamilySpec::new(FamilyId::Bernoulli, ChiSquare, fit::fit_bernoulli, test_bernoulli),
            FamilySpec::new(FamilyId::Binomial, ChiSquare, fit::fit_binomial, test_binomial),
            FamilySpec::new(FamilyId::Geometric, ChiSquare, fit::fit_geometric, test_geometric),
            FamilySpec::new(FamilyId::Poisson, ChiSquare, fit::fit_poisson, test_poisson),
        ];

        Self {
            specs: table.into_iter().map(|spec| (spec.id, spec)).collect(),
        }
    }

    pub fn get(&self, id: FamilyId) -> Option<&FamilySpec> {
        self.specs.get(&id)
    }

    /// Resolve a wire token to its spec.
    pub fn lookup(&self, token: &str) -> Result<&FamilySpec, TestError> {
        let id: FamilyId = token.parse()?;
        self.get(id)
            .ok_or_else(|| TestError::UnsupportedFamily(token.trim().to_string()))
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
