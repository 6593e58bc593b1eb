//! Report and ROC curve writers.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::EvalError;
use crate::report::ExperimentReport;
use crate::roc::RocCurve;

/// Prefix for every file a run writes: one or more of `[a-zA-Z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidExperimentName`] for an empty name or one
    /// that could escape the output directory or break a file name.
    pub fn new(name: impl Into<String>) -> Result<Self, EvalError> {
        let name = name.into();
        let allowed = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-');
        if name.is_empty() || !name.bytes().all(allowed) {
            return Err(EvalError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Puts `{experiment}_report.json` and one
/// `{experiment}_{model}_{partition}_roc.csv` per evaluation into a directory.
pub struct ReportWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ReportWriter {
    /// Creates `output_dir` (and its parents) if missing.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, EvalError> {
        let output_dir = output_dir.to_path_buf();
        if let Err(source) = fs::create_dir_all(&output_dir) {
            return Err(EvalError::OutputDirCreate {
                path: output_dir,
                source,
            });
        }
        debug!("output directory ready");
        Ok(Self {
            output_dir,
            experiment,
        })
    }

    #[must_use]
    pub fn experiment(&self) -> &ExperimentName {
        &self.experiment
    }

    /// Write `report` as pretty JSON to `{experiment}_report.json`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Serialize`] or [`EvalError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_report(&self, report: &ExperimentReport) -> Result<PathBuf, EvalError> {
        let path = self.file_path("report.json");
        let json = serde_json::to_string_pretty(report)?;
        if let Err(source) = fs::write(&path, json) {
            return Err(EvalError::WriteFile { path, source });
        }

        info!(path = %path.display(), n_evaluations = report.evaluations.len(), "report written");
        Ok(path)
    }

    /// Write the curve's `threshold,fpr,tpr` rows to
    /// `{experiment}_{model}_{partition}_roc.csv`.
    ///
    /// The first row's threshold is `inf`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::WriteCsv`] or [`EvalError::WriteFile`].
    #[instrument(skip(self, roc))]
    pub fn write_roc(
        &self,
        model: &str,
        partition: &str,
        roc: &RocCurve,
    ) -> Result<PathBuf, EvalError> {
        let path = self.file_path(&format!("{model}_{partition}_roc.csv"));

        let csv_err = |e| EvalError::WriteCsv {
            path: path.clone(),
            source: e,
        };
        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        for point in roc.points() {
            wtr.serialize(point).map_err(csv_err)?;
        }
        if let Err(source) = wtr.flush() {
            return Err(EvalError::WriteFile { path, source });
        }

        info!(path = %path.display(), n_points = roc.points().len(), "ROC curve written");
        Ok(path)
    }

    fn file_path(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{suffix}", self.experiment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SplitSizes;
    use fraudlens_data::BinaryLabel::{Fraud, Genuine};

    #[test]
    fn accepts_dataset_style_names() {
        let name = ExperimentName::new("kaggle-run_01").unwrap();
        assert_eq!(name.as_str(), "kaggle-run_01");
    }

    #[test]
    fn rejects_names_unsafe_for_paths() {
        for bad in ["", "has space", "../escape", "semi;colon"] {
            assert!(matches!(
                ExperimentName::new(bad),
                Err(EvalError::InvalidExperimentName { .. })
            ));
        }
    }

    #[test]
    fn writes_report_and_roc() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let writer = ReportWriter::new(&out, ExperimentName::new("exp").unwrap()).unwrap();

        let report = ExperimentReport {
            experiment: "exp".to_string(),
            seed: 42,
            sizes: SplitSizes {
                loaded: 10,
                sampled: 10,
                train: 8,
                test: 2,
                estimation: 6,
                validation: 2,
            },
            evaluations: Vec::new(),
        };
        let report_path = writer.write_report(&report).unwrap();
        assert_eq!(report_path, out.join("exp_report.json"));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["sizes"]["train"], 8);

        let roc = RocCurve::from_scores(&[Fraud, Genuine, Genuine], &[0.8, 0.3, 0.1]).unwrap();
        let roc_path = writer.write_roc("decision_tree", "test", &roc).unwrap();
        assert_eq!(roc_path, out.join("exp_decision_tree_test_roc.csv"));

        let text = fs::read_to_string(&roc_path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "threshold,fpr,tpr");
        assert_eq!(lines.len(), roc.points().len() + 1);
        assert!(lines[1].starts_with("inf,"));
        assert_eq!(lines[lines.len() - 1], "0.1,1.0,1.0");
    }
}
