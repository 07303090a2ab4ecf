//! Export evaluation results to JSON or CSV.
//!
//! The JSON report wraps the entries in a small envelope (tool name,
//! generation time, significance, sample size) so that exported files are
//! self-describing. The CSV flattens the detailed evaluations into one row
//! per requested family, meant for spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{FamilyEvaluation, OutcomeEntry};
use crate::error::AppError;
use crate::io::sample::SampleFormat;

pub const TOOL_NAME: &str = "gof";

/// JSON export envelope.
#[derive(Debug, Serialize)]
pub struct ResultsReport<'a> {
    pub tool: &'static str,
    pub generated_at: DateTime<Utc>,
    pub significance: f64,
    pub sample_size: usize,
    pub results: &'a [OutcomeEntry],
}

impl<'a> ResultsReport<'a> {
    pub fn new(results: &'a [OutcomeEntry], significance: f64, sample_size: usize) -> Self {
        Self {
            tool: TOOL_NAME,
            generated_at: Utc::now(),
            significance,
            sample_size,
            results,
        }
    }
}

/// Write results, choosing JSON or CSV from the extension.
pub fn write_results(
    path: &Path,
    evaluations: &[FamilyEvaluation],
    significance: f64,
    sample_size: usize,
) -> Result<(), AppError> {
    match SampleFormat::from_path(path)? {
        SampleFormat::Json => {
            let entries: Vec<OutcomeEntry> =
                evaluations.iter().map(FamilyEvaluation::to_entry).collect();
            write_results_json(path, &ResultsReport::new(&entries, significance, sample_size))
        }
        SampleFormat::Csv => write_results_csv(path, evaluations),
    }
}

pub fn write_results_json(path: &Path, report: &ResultsReport<'_>) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create results JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write results JSON: {e}")))?;
    Ok(())
}

/// One CSV row per requested family; failed families fill `error` only.
pub fn write_results_csv(path: &Path, evaluations: &[FamilyEvaluation]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::new(2, format!("Failed to create results CSV '{}': {e}", path.display()))
    })?;

    writer
        .write_record([
            "dist_type",
            "is_dist",
            "p_value",
            "statistic",
            "method",
            "params",
            "error",
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write results CSV header: {e}")))?;

    for eval in evaluations {
        let row = match &eval.result {
            Ok(v) => [
                eval.dist_type.clone(),
                v.outcome.is_dist.to_string(),
                format!("{:.10}", v.outcome.p_value),
                format!("{:.10}", v.outcome.statistic),
                v.method.display_name().to_string(),
                v.params.summary(),
                String::new(),
            ],
            Err(e) => [
                eval.dist_type.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                e.to_string(),
            ],
        };
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write results CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush results CSV: {e}")))?;
    Ok(())
}
