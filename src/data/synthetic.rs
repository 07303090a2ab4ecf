//! Seeded synthetic samples for every supported family.
//!
//! Used by `gof simulate` to produce reproducible inputs and by tests that
//! need data with a known generating family. Each family draws from a fixed
//! canonical parameterization (see `canonical_parameters`).

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{
    Bernoulli, Beta, Binomial, ChiSquared, Exp, Gamma, Geometric, LogNormal, Normal, Poisson,
    StudentT, Uniform, Weibull,
};

use crate::domain::{FamilyId, Sample};
use crate::error::AppError;

/// Mean count targeted by binomial samples (trials = sample size).
const BINOMIAL_MEAN: f64 = 5.0;

/// Human-readable description of the parameters `generate_sample` uses.
pub fn canonical_parameters(family: FamilyId, n: usize) -> String {
    match family {
        FamilyId::Normal => "mean=10 sd=2".to_string(),
        FamilyId::StudentT => "df=5 loc=0 scale=1".to_string(),
        FamilyId::LogNormal => "mu=0 sigma=0.5".to_string(),
        FamilyId::ChiSquared => "df=4".to_string(),
        FamilyId::Gamma => "shape=2 scale=2".to_string(),
        FamilyId::Beta => "a=2 b=5".to_string(),
        FamilyId::Weibull => "shape=1.5 scale=1".to_string(),
        FamilyId::Exponential => "scale=1".to_string(),
        FamilyId::Uniform => "min=0 max=1".to_string(),
        FamilyId::Bernoulli => "p=0.4".to_string(),
        FamilyId::Binomial => format!("n={n} p={:.6}", binomial_p(n)),
        FamilyId::Geometric => "p=0.3 (support 1, 2, ...)".to_string(),
        FamilyId::Poisson => "lambda=4".to_string(),
    }
}

fn binomial_p(n: usize) -> f64 {
    (BINOMIAL_MEAN / n.max(1) as f64).min(0.5)
}

fn dist_error(e: impl std::fmt::Display) -> AppError {
    AppError::new(4, format!("Sampling distribution error: {e}"))
}

fn draw<D: Distribution<f64>>(dist: D, n: usize, rng: &mut StdRng) -> Vec<f64> {
    (0..n).map(|_| dist.sample(rng)).collect()
}

/// Draw `n` values from `family` with a fixed seed.
pub fn generate_sample(family: FamilyId, n: usize, seed: u64) -> Result<Sample, AppError> {
    if n == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let rng = &mut rng;

    let values = match family {
        FamilyId::Normal => draw(Normal::new(10.0, 2.0).map_err(dist_error)?, n, rng),
        FamilyId::StudentT => draw(StudentT::new(5.0).map_err(dist_error)?, n, rng),
        FamilyId::LogNormal => draw(LogNormal::new(0.0, 0.5).map_err(dist_error)?, n, rng),
        FamilyId::ChiSquared => draw(ChiSquared::new(4.0).map_err(dist_error)?, n, rng),
        FamilyId::Gamma => draw(Gamma::new(2.0, 2.0).map_err(dist_error)?, n, rng),
        FamilyId::Beta => draw(Beta::new(2.0, 5.0).map_err(dist_error)?, n, rng),
        // rand_distr takes (scale, shape).
        FamilyId::Weibull => draw(Weibull::new(1.0, 1.5).map_err(dist_error)?, n, rng),
        FamilyId::Exponential => draw(Exp::new(1.0).map_err(dist_error)?, n, rng),
        FamilyId::Uniform => draw(Uniform::new(0.0, 1.0), n, rng),
        FamilyId::Poisson => draw(Poisson::new(4.0).map_err(dist_error)?, n, rng),
        FamilyId::Bernoulli => {
            let dist = Bernoulli::new(0.4).map_err(dist_error)?;
            (0..n).map(|_| if dist.sample(rng) { 1.0 } else { 0.0 }).collect()
        }
        FamilyId::Binomial => {
            let dist = Binomial::new(n as u64, binomial_p(n)).map_err(dist_error)?;
            (0..n).map(|_| dist.sample(rng) as f64).collect()
        }
        FamilyId::Geometric => {
            // rand_distr counts failures before the first success.
            let dist = Geometric::new(0.3).map_err(dist_error)?;
            (0..n).map(|_| (dist.sample(rng) + 1) as f64).collect()
        }
    };

    Ok(Sample::new(values)?)
}
