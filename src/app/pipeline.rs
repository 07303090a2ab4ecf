//! Shared "test pipeline" logic used by the CLI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load sample -> resolve families -> evaluate -> collect entries
//!
//! Front-ends can then focus on presentation (table vs JSON vs export).

use std::path::Path;

use tracing::info;

use crate::domain::{FamilyEvaluation, FamilyId, OutcomeEntry, Sample, TesterConfig};
use crate::error::AppError;
use crate::tester::Tester;

/// All computed outputs of a single `gof test` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: Sample,
    pub evaluations: Vec<FamilyEvaluation>,
}

impl RunOutput {
    pub fn entries(&self) -> Vec<OutcomeEntry> {
        self.evaluations.iter().map(FamilyEvaluation::to_entry).collect()
    }
}

/// Families named on the command line, or every family when none are given.
pub fn requested_families(types: Option<&str>) -> Vec<String> {
    let listed = types.map(crate::cli::parse_family_list).unwrap_or_default();
    if listed.is_empty() {
        FamilyId::ALL.iter().map(|f| f.token().to_string()).collect()
    } else {
        listed
    }
}

/// Load the sample at `path` and evaluate it.
pub fn run_test(path: &Path, families: &[String], config: &TesterConfig) -> Result<RunOutput, AppError> {
    let sample = crate::io::load_sample(path)?;
    info!(path = %path.display(), n = sample.len(), "sample loaded");
    run_test_with_sample(sample, families, config)
}

/// Evaluate an already loaded sample.
pub fn run_test_with_sample(
    sample: Sample,
    families: &[String],
    config: &TesterConfig,
) -> Result<RunOutput, AppError> {
    let tester = Tester::new(config.clone())?;
    let evaluations = tester.evaluate_detailed(sample.values(), families)?;

    let failed = evaluations.iter().filter(|e| e.result.is_err()).count();
    info!(
        families = evaluations.len(),
        failed,
        "evaluation finished"
    );

    Ok(RunOutput {
        sample,
        evaluations,
    })
}
