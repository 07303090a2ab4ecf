//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation and testing
//! - returned over the command interface as JSON
//! - exported to JSON/CSV reports

use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::TestError;

/// Significance level used to interpret every goodness-of-fit p-value.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// Supported distribution families (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum FamilyId {
    #[serde(rename = "normal")]
    #[value(name = "normal")]
    Normal,
    #[serde(rename = "t")]
    #[value(name = "t")]
    StudentT,
    #[serde(rename = "lognorm")]
    #[value(name = "lognorm")]
    LogNormal,
    #[serde(rename = "chi2")]
    #[value(name = "chi2")]
    ChiSquared,
    #[serde(rename = "gamma")]
    #[value(name = "gamma")]
    Gamma,
    #[serde(rename = "beta")]
    #[value(name = "beta")]
    Beta,
    #[serde(rename = "weibull")]
    #[value(name = "weibull")]
    Weibull,
    #[serde(rename = "exponential")]
    #[value(name = "exponential")]
    Exponential,
    #[serde(rename = "uniform")]
    #[value(name = "uniform")]
    Uniform,
    #[serde(rename = "bernoulli")]
    #[value(name = "bernoulli")]
    Bernoulli,
    #[serde(rename = "binomial")]
    #[value(name = "binomial")]
    Binomial,
    #[serde(rename = "geometric")]
    #[value(name = "geometric")]
    Geometric,
    #[serde(rename = "poisson")]
    #[value(name = "poisson")]
    Poisson,
}

impl FamilyId {
    pub const ALL: [FamilyId; 13] = [
        FamilyId::Normal,
        FamilyId::StudentT,
        FamilyId::LogNormal,
        FamilyId::ChiSquared,
        FamilyId::Gamma,
        FamilyId::Beta,
        FamilyId::Weibull,
        FamilyId::Exponential,
        FamilyId::Uniform,
        FamilyId::Bernoulli,
        FamilyId::Binomial,
        FamilyId::Geometric,
        FamilyId::Poisson,
    ];

    /// Wire token (what callers pass in and what `dist_type` echoes).
    pub fn token(self) -> &'static str {
        match self {
            FamilyId::Normal => "normal",
            FamilyId::StudentT => "t",
            FamilyId::LogNormal => "lognorm",
            FamilyId::ChiSquared => "chi2",
            FamilyId::Gamma => "gamma",
            FamilyId::Beta => "beta",
            FamilyId::Weibull => "weibull",
            FamilyId::Exponential => "exponential",
            FamilyId::Uniform => "uniform",
            FamilyId::Bernoulli => "bernoulli",
            FamilyId::Binomial => "binomial",
            FamilyId::Geometric => "geometric",
            FamilyId::Poisson => "poisson",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FamilyId::Normal => "Normal",
            FamilyId::StudentT => "Student's t",
            FamilyId::LogNormal => "Log-normal",
            FamilyId::ChiSquared => "Chi-squared",
            FamilyId::Gamma => "Gamma",
            FamilyId::Beta => "Beta",
            FamilyId::Weibull => "Weibull (min)",
            FamilyId::Exponential => "Exponential",
            FamilyId::Uniform => "Uniform",
            FamilyId::Bernoulli => "Bernoulli",
            FamilyId::Binomial => "Binomial",
            FamilyId::Geometric => "Geometric",
            FamilyId::Poisson => "Poisson",
        }
    }

    /// Count-valued families (tested with chi-square).
    pub fn is_discrete(self) -> bool {
        matches!(
            self,
            FamilyId::Bernoulli | FamilyId::Binomial | FamilyId::Geometric | FamilyId::Poisson
        )
    }
}

impl FromStr for FamilyId {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        FamilyId::ALL
            .into_iter()
            .find(|f| f.token() == token)
            .ok_or_else(|| TestError::UnsupportedFamily(token.to_string()))
    }
}

impl std::fmt::Display for FamilyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// An observed sample. Non-empty by construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sample(Vec<f64>);

impl Sample {
    pub fn new(values: Vec<f64>) -> Result<Self, TestError> {
        if values.is_empty() {
            return Err(TestError::EmptySample);
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.0
    }
}

impl TryFrom<Vec<f64>> for Sample {
    type Error = TestError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Sample::new(values)
    }
}

/// Parameters estimated for one family (fresh per evaluation, never persisted).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum FittedParameters {
    /// The omnibus normality test is parameter-free.
    Normal,
    #[serde(rename = "t")]
    StudentT { df: f64, loc: f64, scale: f64 },
    #[serde(rename = "lognorm")]
    LogNormal { shape: f64, loc: f64, scale: f64 },
    #[serde(rename = "chi2")]
    ChiSquared { df: f64, loc: f64, scale: f64 },
    Gamma { shape: f64, loc: f64, scale: f64 },
    /// `min`/`max` are the bounds used to normalize the sample onto `[0, 1]`.
    Beta { a: f64, b: f64, min: f64, max: f64 },
    Weibull { shape: f64, loc: f64, scale: f64 },
    Exponential { scale: f64 },
    Uniform { min: f64, max: f64 },
    Bernoulli { p: f64 },
    Binomial { n: u64, p: f64 },
    Geometric { p: f64 },
    Poisson { lambda: f64 },
}

impl FittedParameters {
    /// Compact `name=value` rendering for terminal output.
    pub fn summary(&self) -> String {
        match self {
            FittedParameters::Normal => "-".to_string(),
            FittedParameters::StudentT { df, loc, scale } => {
                format!("df={df:.4} loc={loc:.4} scale={scale:.4}")
            }
            FittedParameters::LogNormal { shape, loc, scale }
            | FittedParameters::Gamma { shape, loc, scale }
            | FittedParameters::Weibull { shape, loc, scale } => {
                format!("shape={shape:.4} loc={loc:.4} scale={scale:.4}")
            }
            FittedParameters::ChiSquared { df, loc, scale } => {
                format!("df={df:.4} loc={loc:.4} scale={scale:.4}")
            }
            FittedParameters::Beta { a, b, .. } => format!("a={a:.4} b={b:.4}"),
            FittedParameters::Exponential { scale } => format!("scale={scale:.4}"),
            FittedParameters::Uniform { min, max } => format!("min={min:.4} max={max:.4}"),
            FittedParameters::Bernoulli { p } | FittedParameters::Geometric { p } => {
                format!("p={p:.4}")
            }
            FittedParameters::Binomial { n, p } => format!("n={n} p={p:.4}"),
            FittedParameters::Poisson { lambda } => format!("lambda={lambda:.4}"),
        }
    }
}

/// Which goodness-of-fit test a family uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestMethod {
    /// D'Agostino–Pearson K² (skewness + kurtosis).
    Normality,
    /// Two-sided one-sample Kolmogorov–Smirnov.
    KolmogorovSmirnov,
    /// Pearson chi-square on binned counts.
    ChiSquare,
}

impl TestMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            TestMethod::Normality => "K2",
            TestMethod::KolmogorovSmirnov => "KS",
            TestMethod::ChiSquare => "chi2",
        }
    }
}

/// Raw output of a goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GofStatistic {
    pub statistic: f64,
    pub p_value: f64,
}

/// Verdict for one requested family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub dist_type: String,
    pub is_dist: bool,
    pub p_value: f64,
    pub statistic: f64,
}

/// A family that could not be tested, at its request position.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyFailure {
    pub dist_type: String,
    pub error: TestError,
}

impl Serialize for FamilyFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("FamilyFailure", 2)?;
        state.serialize_field("dist_type", &self.dist_type)?;
        state.serialize_field("error", &self.error.to_string())?;
        state.end()
    }
}

/// One position of the `evaluate` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutcomeEntry {
    Tested(TestOutcome),
    Failed(FamilyFailure),
}

impl OutcomeEntry {
    pub fn dist_type(&self) -> &str {
        match self {
            OutcomeEntry::Tested(o) => &o.dist_type,
            OutcomeEntry::Failed(f) => &f.dist_type,
        }
    }

    pub fn outcome(&self) -> Option<&TestOutcome> {
        match self {
            OutcomeEntry::Tested(o) => Some(o),
            OutcomeEntry::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TestError> {
        match self {
            OutcomeEntry::Tested(_) => None,
            OutcomeEntry::Failed(f) => Some(&f.error),
        }
    }
}

/// Successful family evaluation with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyVerdict {
    pub family: FamilyId,
    pub method: TestMethod,
    pub params: FittedParameters,
    pub outcome: TestOutcome,
}

/// Detailed result for one requested token (used by reports).
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyEvaluation {
    pub dist_type: String,
    pub result: Result<FamilyVerdict, TestError>,
}

impl FamilyEvaluation {
    pub fn to_entry(&self) -> OutcomeEntry {
        match &self.result {
            Ok(verdict) => OutcomeEntry::Tested(verdict.outcome.clone()),
            Err(error) => OutcomeEntry::Failed(FamilyFailure {
                dist_type: self.dist_type.clone(),
                error: error.clone(),
            }),
        }
    }
}

/// Tester configuration.
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// p-values strictly above this level are classified as a fit.
    pub significance: f64,
    /// Evaluate requested families concurrently.
    pub parallel: bool,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE,
            parallel: true,
        }
    }
}

impl TesterConfig {
    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        if !(self.significance.is_finite() && self.significance > 0.0 && self.significance < 1.0) {
            return Err(crate::error::AppError::new(
                2,
                format!(
                    "Invalid significance level {} (must be in (0, 1)).",
                    self.significance
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_tokens_round_trip_through_from_str() {
        for family in FamilyId::ALL {
            assert_eq!(family.token().parse::<FamilyId>().unwrap(), family);
        }
    }

    #[test]
    fn unknown_token_is_unsupported() {
        let err = "not_a_family".parse::<FamilyId>().unwrap_err();
        assert_eq!(err, TestError::UnsupportedFamily("not_a_family".to_string()));
    }

    #[test]
    fn empty_sample_is_rejected() {
        assert_eq!(Sample::new(Vec::new()).unwrap_err(), TestError::EmptySample);
    }

    #[test]
    fn entries_serialize_in_wire_shape() {
        let tested = OutcomeEntry::Tested(TestOutcome {
            dist_type: "normal".to_string(),
            is_dist: true,
            p_value: 0.5,
            statistic: 1.25,
        });
        let json = serde_json::to_value(&tested).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"dist_type": "normal", "is_dist": true, "p_value": 0.5, "statistic": 1.25})
        );

        let failed = OutcomeEntry::Failed(FamilyFailure {
            dist_type: "nope".to_string(),
            error: TestError::UnsupportedFamily("nope".to_string()),
        });
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["dist_type"], "nope");
        assert!(json["error"].as_str().unwrap().starts_with("UnsupportedFamily"));
        assert!(json.get("p_value").is_none());
    }

    #[test]
    fn default_config_uses_five_percent() {
        let config = TesterConfig::default();
        assert_eq!(config.significance, 0.05);
        assert!(config.validate().is_ok());
        let bad = TesterConfig {
            significance: 1.5,
            ..config
        };
        assert!(bad.validate().is_err());
    }
}
