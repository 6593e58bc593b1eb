//! Error types for fraudlens-eval.

use std::path::PathBuf;

use fraudlens_data::BinaryLabel;
use fraudlens_rf::RfError;

/// Errors from scoring, evaluation, and report writing.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Returned when a metric is requested over zero records.
    #[error("empty input: nothing to evaluate")]
    EmptyInput,

    /// Returned when paired slices have different lengths.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Length of the reference slice.
        expected: usize,
        /// Length of the other slice.
        got: usize,
    },

    /// Returned when a fraud probability is NaN, infinite, or outside [0, 1].
    #[error("score {index} is {value}, not a probability in [0, 1]")]
    InvalidProbability {
        /// Position of the offending score.
        index: usize,
        /// The rejected value.
        value: f64,
    },

    /// Returned when every record belongs to one class, leaving the ROC
    /// curve undefined.
    #[error("all {n_samples} records are {class}; ROC and AUC need both classes")]
    SingleClass {
        /// The only class present.
        class: BinaryLabel,
        /// Number of records.
        n_samples: usize,
    },

    /// Returned when a record position is past the end of a scored split.
    #[error("index {index} out of bounds for {len} scored records")]
    IndexOutOfBounds {
        /// Requested position.
        index: usize,
        /// Number of scored records.
        len: usize,
    },

    /// Returned when a model does not produce exactly two class probabilities.
    #[error("model predicts {got} classes, expected 2 (fraud, genuine)")]
    NotBinary {
        /// Number of classes the model reports.
        got: usize,
    },

    /// Returned when the model rejects a record during prediction.
    #[error("prediction failed")]
    Predict {
        /// Underlying model error.
        #[from]
        source: RfError,
    },

    /// Returned when the experiment name contains invalid characters.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The rejected name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Directory path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a JSON output file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// File path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV output file cannot be created or written.
    #[error("cannot write CSV file {path}")]
    WriteCsv {
        /// File path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when a report cannot be serialized.
    #[error("cannot serialize report")]
    Serialize {
        /// Underlying serde_json error.
        #[from]
        source: serde_json::Error,
    },
}
