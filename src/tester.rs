//! The conformance tester: evaluate one sample against a list of families.
//!
//! `evaluate` is the core contract:
//! - an empty sample fails the whole call with `EmptySample`
//! - every requested token gets exactly one entry, at its request position
//! - per-family failures become error-tagged entries; nothing else aborts
//!
//! Families are independent, so with `TesterConfig::parallel` they are
//! evaluated on the rayon pool; `collect` keeps request order.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{
    FamilyEvaluation, FamilyVerdict, OutcomeEntry, Sample, TestOutcome, TesterConfig,
};
use crate::error::{AppError, TestError};
use crate::registry::FamilyRegistry;

#[derive(Debug, Clone)]
pub struct Tester {
    config: TesterConfig,
    registry: FamilyRegistry,
}

impl Default for Tester {
    fn default() -> Self {
        Self {
            config: TesterConfig::default(),
            registry: FamilyRegistry::standard(),
        }
    }
}

impl Tester {
    /// Build a tester; the significance level must lie in `(0, 1)`.
    pub fn new(config: TesterConfig) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: FamilyRegistry::standard(),
        })
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    pub fn registry(&self) -> &FamilyRegistry {
        &self.registry
    }

    /// Evaluate `values` against every family in `families`.
    pub fn evaluate<S: AsRef<str> + Sync>(
        &self,
        values: &[f64],
        families: &[S],
    ) -> Result<Vec<OutcomeEntry>, TestError> {
        Ok(self
            .evaluate_detailed(values, families)?
            .iter()
            .map(FamilyEvaluation::to_entry)
            .collect())
    }

    /// Like `evaluate`, keeping fitted parameters and test method per family.
    pub fn evaluate_detailed<S: AsRef<str> + Sync>(
        &self,
        values: &[f64],
        families: &[S],
    ) -> Result<Vec<FamilyEvaluation>, TestError> {
        if values.is_empty() {
            return Err(TestError::EmptySample);
        }

        let evaluations: Vec<FamilyEvaluation> = if self.config.parallel {
            families
                .par_iter()
                .map(|token| self.evaluate_family(values, token.as_ref()))
                .collect()
        } else {
            families
                .iter()
                .map(|token| self.evaluate_family(values, token.as_ref()))
                .collect()
        };
        Ok(evaluations)
    }

    /// Evaluate a validated sample.
    pub fn evaluate_sample<S: AsRef<str> + Sync>(
        &self,
        sample: &Sample,
        families: &[S],
    ) -> Result<Vec<OutcomeEntry>, TestError> {
        self.evaluate(sample.values(), families)
    }

    fn evaluate_family(&self, values: &[f64], token: &str) -> FamilyEvaluation {
        let result = self.run_family(values, token);
        match &result {
            Ok(verdict) => debug!(
                family = token,
                method = verdict.method.display_name(),
                params = %verdict.params.summary(),
                statistic = verdict.outcome.statistic,
                p_value = verdict.outcome.p_value,
                is_dist = verdict.outcome.is_dist,
                "family evaluated"
            ),
            Err(err) => warn!(family = token, error = %err, "family evaluation failed"),
        }
        FamilyEvaluation {
            dist_type: token.to_string(),
            result,
        }
    }

    fn run_family(&self, values: &[f64], token: &str) -> Result<FamilyVerdict, TestError> {
        let spec = self.registry.lookup(token)?;
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(TestError::precondition(format!(
                "sample contains a non-finite value ({bad})"
            )));
        }

        let (params, stat) = spec.run(values)?;
        if !(stat.statistic.is_finite() && (0.0..=1.0).contains(&stat.p_value)) {
            return Err(TestError::fit(format!(
                "test produced an unusable result (statistic={}, p_value={})",
                stat.statistic, stat.p_value
            )));
        }

        Ok(FamilyVerdict {
            family: spec.id,
            method: spec.method,
            params,
            outcome: TestOutcome {
                dist_type: token.to_string(),
                is_dist: stat.p_value > self.config.significance,
                p_value: stat.p_value,
                statistic: stat.statistic,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FamilyId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Exp, Gamma, LogNormal, Normal, Poisson, Uniform};

    fn draw<D: Distribution<f64>>(dist: D, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    fn sequential() -> Tester {
        Tester::new(TesterConfig {
            parallel: false,
            ..TesterConfig::default()
        })
        .unwrap()
    }

    fn p_value(entry: &OutcomeEntry) -> f64 {
        match entry.outcome() {
            Some(o) => o.p_value,
            None => panic!("{} failed: {:?}", entry.dist_type(), entry.error()),
        }
    }

    #[test]
    fn bernoulli_scenario() {
        let xs = [1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        let detailed = Tester::default().evaluate_detailed(&xs, &["bernoulli"]).unwrap();
        let verdict = detailed[0].result.as_ref().unwrap();
        assert_eq!(verdict.family, FamilyId::Bernoulli);
        assert_eq!(verdict.params, crate::domain::FittedParameters::Bernoulli { p: 0.625 });
        assert!(verdict.outcome.statistic.abs() < 1e-12);
        assert!((verdict.outcome.p_value - 1.0).abs() < 1e-12);
        assert!(verdict.outcome.is_dist);
        assert_eq!(verdict.outcome.dist_type, "bernoulli");
    }

    #[test]
    fn empty_sample_fails_whole_call() {
        let err = Tester::default().evaluate(&[], &["normal", "t"]).unwrap_err();
        assert_eq!(err, TestError::EmptySample);
    }

    #[test]
    fn unsupported_family_is_reported_in_place() {
        let entries = Tester::default()
            .evaluate(&[1.0, 2.0, 3.0], &["uniform", "not_a_family", "exponential"])
            .unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].outcome().is_some());
        assert_eq!(
            entries[1].error(),
            Some(&TestError::UnsupportedFamily("not_a_family".to_string()))
        );
        assert_eq!(entries[1].dist_type(), "not_a_family");
        assert!(entries[2].outcome().is_some());
    }

    #[test]
    fn output_order_matches_request_order() {
        let xs = draw(Gamma::new(3.0, 1.5).unwrap(), 200, 1);
        let tokens: Vec<&str> = FamilyId::ALL.iter().map(|f| f.token()).rev().collect();
        let entries = Tester::default().evaluate(&xs, &tokens).unwrap();
        assert_eq!(entries.len(), tokens.len());
        for (entry, token) in entries.iter().zip(&tokens) {
            assert_eq!(entry.dist_type(), *token);
        }
    }

    #[test]
    fn is_dist_agrees_with_threshold() {
        let xs = draw(LogNormal::new(0.0, 0.6).unwrap(), 300, 2);
        let tokens: Vec<&str> = FamilyId::ALL.iter().map(|f| f.token()).collect();
        for entry in Tester::default().evaluate(&xs, &tokens).unwrap() {
            if let Some(o) = entry.outcome() {
                assert!((0.0..=1.0).contains(&o.p_value));
                assert_eq!(o.is_dist, o.p_value > 0.05, "{}", o.dist_type);
            }
        }
    }

    #[test]
    fn p_value_equal_to_significance_is_rejected() {
        let xs = draw(Normal::new(0.0, 1.0).unwrap(), 60, 4);
        let p = p_value(&Tester::default().evaluate(&xs, &["uniform"]).unwrap()[0]);
        assert!(p > 0.0 && p < 1.0, "p={p}");

        let at_threshold = Tester::new(TesterConfig {
            significance: p,
            ..TesterConfig::default()
        })
        .unwrap();
        let entries = at_threshold.evaluate(&xs, &["uniform"]).unwrap();
        let outcome = entries[0].outcome().unwrap();
        assert_eq!(outcome.p_value, p);
        assert!(!outcome.is_dist);
    }

    #[test]
    fn invalid_significance_is_refused() {
        for significance in [0.0, 1.0, 1.5, f64::NAN] {
            let config = TesterConfig {
                significance,
                ..TesterConfig::default()
            };
            let err = Tester::new(config).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn parallel_and_sequential_results_are_identical() {
        let xs = draw(Normal::new(2.0, 3.0).unwrap(), 150, 3);
        let tokens = ["normal", "t", "lognorm", "gamma", "weibull", "beta", "uniform"];
        let seq = sequential().evaluate(&xs, &tokens).unwrap();
        let par = Tester::default().evaluate(&xs, &tokens).unwrap();
        let again = Tester::default().evaluate(&xs, &tokens).unwrap();
        assert_eq!(seq, par);
        assert_eq!(par, again);
    }

    #[test]
    fn non_binary_bernoulli_is_precondition_violation() {
        let entries = sequential().evaluate(&[0.0, 1.0, 2.0], &["bernoulli"]).unwrap();
        assert!(matches!(
            entries[0].error(),
            Some(TestError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn non_finite_values_fail_per_family() {
        let entries = sequential()
            .evaluate(&[1.0, f64::NAN, 3.0], &["normal", "poisson"])
            .unwrap();
        for entry in &entries {
            assert!(matches!(entry.error(), Some(TestError::PreconditionViolation(_))));
        }
    }

    #[test]
    fn true_families_are_not_rejected() {
        let tester = Tester::default();
        let cases: Vec<(&str, Vec<f64>)> = vec![
            ("normal", draw(Normal::new(10.0, 2.0).unwrap(), 500, 11)),
            ("exponential", draw(Exp::new(0.5).unwrap(), 500, 12)),
            ("gamma", draw(Gamma::new(2.5, 2.0).unwrap(), 500, 13)),
            ("uniform", draw(Uniform::new(-1.0, 4.0), 500, 14)),
            ("poisson", draw(Poisson::new(4.0).unwrap(), 500, 15)),
        ];
        for (family, xs) in cases {
            let entries = tester.evaluate(&xs, &[family]).unwrap();
            let p = p_value(&entries[0]);
            assert!(p > 1e-3, "{family}: p={p}");
        }
    }

    #[test]
    fn wrong_families_are_rejected() {
        let tester = Tester::default();
        let expo = draw(Exp::new(1.0).unwrap(), 1000, 21);
        let entries = tester.evaluate(&expo, &["normal", "uniform"]).unwrap();
        for entry in &entries {
            let p = p_value(entry);
            assert!(p < 1e-4, "{}: p={p}", entry.dist_type());
        }
    }
}
