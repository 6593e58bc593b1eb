//! Scoring and evaluation of fraud classifiers.
//!
//! Turns a trained [`fraudlens_rf::Classifier`] and a labeled split into
//! per-record fraud probabilities, then summarizes them as a binary
//! confusion matrix and an ROC curve with fraud as the positive class.
//! [`ReportWriter`] persists the results.

mod confusion;
mod error;
mod report;
mod roc;
mod score;
mod writer;

pub use confusion::BinaryConfusion;
pub use error::EvalError;
pub use report::{Evaluation, ExperimentReport, FeatureWeight, Lookup, Metrics, SplitSizes};
pub use roc::{RocCurve, RocPoint};
pub use score::{Score, ScoredSplit, score};
pub use writer::{ExperimentName, ReportWriter};
