//! Sample storage: load and save observation vectors.
//!
//! Two on-disk formats, chosen by file extension:
//! - `.json`: either a bare array `[1.0, 2.0]` or an object `{"data": [1.0, 2.0]}`
//! - `.csv`: one value per row, first column only; an optional non-numeric
//!   header row is skipped
//!
//! Values keep their file order in both directions.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Sample;
use crate::error::AppError;

/// Storage collaborator for samples.
pub trait SampleStore {
    fn load(&self, path: &Path) -> Result<Sample, AppError>;
    fn save(&self, sample: &Sample, path: &Path) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    Json,
    Csv,
}

impl SampleFormat {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(SampleFormat::Json),
            Some("csv") => Ok(SampleFormat::Csv),
            _ => Err(AppError::new(
                2,
                format!(
                    "Unsupported sample file '{}' (expected .json or .csv).",
                    path.display()
                ),
            )),
        }
    }

    pub fn store(self) -> &'static dyn SampleStore {
        match self {
            SampleFormat::Json => &JsonSampleStore,
            SampleFormat::Csv => &CsvSampleStore,
        }
    }
}

/// Load a sample, picking the format from the extension.
pub fn load_sample(path: &Path) -> Result<Sample, AppError> {
    SampleFormat::from_path(path)?.store().load(path)
}

/// Save a sample, picking the format from the extension.
pub fn save_sample(sample: &Sample, path: &Path) -> Result<(), AppError> {
    SampleFormat::from_path(path)?.store().save(sample, path)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonSample {
    Bare(Vec<f64>),
    Wrapped { data: Vec<f64> },
}

#[derive(Serialize)]
struct JsonSampleOut<'a> {
    data: &'a [f64],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSampleStore;

impl SampleStore for JsonSampleStore {
    fn load(&self, path: &Path) -> Result<Sample, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(2, format!("Failed to open sample JSON '{}': {e}", path.display()))
        })?;
        let parsed: JsonSample = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid sample JSON: {e}")))?;
        let values = match parsed {
            JsonSample::Bare(values) | JsonSample::Wrapped { data: values } => values,
        };
        Ok(Sample::new(values)?)
    }

    fn save(&self, sample: &Sample, path: &Path) -> Result<(), AppError> {
        let file = File::create(path).map_err(|e| {
            AppError::new(2, format!("Failed to create sample JSON '{}': {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(
            file,
            &JsonSampleOut {
                data: sample.values(),
            },
        )
        .map_err(|e| AppError::new(2, format!("Failed to write sample JSON: {e}")))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSampleStore;

impl SampleStore for CsvSampleStore {
    fn load(&self, path: &Path) -> Result<Sample, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(2, format!("Failed to open sample CSV '{}': {e}", path.display()))
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut values = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let line = idx + 1;
            let record =
                result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;
            let Some(field) = record.get(0).filter(|f| !f.is_empty()) else {
                continue;
            };
            match field.parse::<f64>() {
                Ok(v) => values.push(v),
                // Header row.
                Err(_) if idx == 0 => continue,
                Err(e) => {
                    return Err(AppError::new(
                        2,
                        format!("Invalid value '{field}' on line {line}: {e}"),
                    ));
                }
            }
        }
        Ok(Sample::new(values)?)
    }

    fn save(&self, sample: &Sample, path: &Path) -> Result<(), AppError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| {
            AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display()))
        })?;
        writer
            .write_record(["value"])
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;
        for v in sample.values() {
            writer
                .write_record([v.to_string()])
                .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("dist-conformance-{}-{name}", std::process::id()))
    }

    fn sample() -> Sample {
        Sample::new(vec![3.5, -1.25, 0.0, 1e-12, 42.0, 3.5]).unwrap()
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let path = temp_path("roundtrip.json");
        save_sample(&sample(), &path).unwrap();
        let loaded = load_sample(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn csv_round_trip_preserves_order() {
        let path = temp_path("roundtrip.csv");
        save_sample(&sample(), &path).unwrap();
        let loaded = load_sample(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn json_accepts_bare_array() {
        let path = temp_path("bare.json");
        std::fs::write(&path, "[1, 2.5, 3]").unwrap();
        let loaded = load_sample(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.values(), &[1.0, 2.5, 3.0]);
    }

    #[test]
    fn empty_files_are_insufficient_data() {
        let path = temp_path("empty.csv");
        std::fs::write(&path, "value\n").unwrap();
        let err = load_sample(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_sample(Path::new("sample.h5")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn bad_csv_value_reports_line() {
        let path = temp_path("bad.csv");
        std::fs::write(&path, "1.0\nabc\n").unwrap();
        let err = load_sample(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.message().contains("line 2"), "{err}");
    }
}
