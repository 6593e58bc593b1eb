//! Evaluation summaries: one per (model, partition) pair, plus the run-level report.

use std::fmt;

use fraudlens_data::BinaryLabel;
use fraudlens_rf::RankedFeature;
use serde::Serialize;

use crate::EvalError;
use crate::confusion::BinaryConfusion;
use crate::roc::RocCurve;
use crate::score::ScoredSplit;

/// Derived rates of a [`BinaryConfusion`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Proportion of correct predictions.
    pub accuracy: f64,
    /// Fraud precision.
    pub precision: f64,
    /// Fraud recall.
    pub recall: f64,
    /// Fraud F1.
    pub f1: f64,
    /// Genuine recall.
    pub specificity: f64,
}

impl From<&BinaryConfusion> for Metrics {
    fn from(cm: &BinaryConfusion) -> Self {
        Self {
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1: cm.f1(),
            specificity: cm.specificity(),
        }
    }
}

/// Probabilities reported for one requested record position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lookup {
    /// Zero-based record position within the evaluated split.
    pub position: usize,
    /// True class of the record.
    pub actual: BinaryLabel,
    /// Predicted class.
    pub predicted: BinaryLabel,
    /// Probability of fraud.
    pub p_fraud: f64,
    /// Probability of a genuine transaction.
    pub p_genuine: f64,
}

/// A feature and its share of the model's total impurity decrease.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureWeight {
    /// Column name.
    pub name: String,
    /// Normalized importance.
    pub importance: f64,
}

impl From<&RankedFeature> for FeatureWeight {
    fn from(f: &RankedFeature) -> Self {
        Self {
            name: f.name.clone(),
            importance: f.importance,
        }
    }
}

/// Everything measured for one model on one partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Model name, e.g. `decision_tree`.
    pub model: String,
    /// Partition name, e.g. `validation`.
    pub partition: String,
    /// Number of evaluated records.
    pub n_records: usize,
    /// Number of fraud records among them.
    pub n_fraud: usize,
    /// Confusion counts.
    pub confusion: BinaryConfusion,
    /// Rates derived from the confusion counts.
    pub metrics: Metrics,
    /// Area under the ROC curve.
    pub auc: f64,
    /// Out-of-bag accuracy of the fitted model, when it has one.
    pub oob_accuracy: Option<f64>,
    /// Requested per-record probabilities.
    pub lookups: Vec<Lookup>,
    /// Most important features, highest first.
    pub top_features: Vec<FeatureWeight>,
}

impl Evaluation {
    /// Summarize a scored split, resolving each position in `lookups`.
    ///
    /// Returns the summary together with its ROC curve.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyInput`] | The split is empty |
    /// | [`EvalError::SingleClass`] | The split holds only one class |
    /// | [`EvalError::IndexOutOfBounds`] | A lookup position is past the end |
    pub fn from_scored(
        model: &str,
        partition: &str,
        scored: &ScoredSplit,
        lookups: &[usize],
    ) -> Result<(Self, RocCurve), EvalError> {
        let confusion = scored.confusion()?;
        let roc = scored.roc()?;

        let lookups = lookups
            .iter()
            .map(|&position| {
                let s = scored.lookup(position)?;
                Ok(Lookup {
                    position,
                    actual: scored.truth()[position],
                    predicted: s.predicted,
                    p_fraud: s.p_fraud,
                    p_genuine: s.p_genuine,
                })
            })
            .collect::<Result<Vec<_>, EvalError>>()?;

        let evaluation = Self {
            model: model.to_string(),
            partition: partition.to_string(),
            n_records: scored.len(),
            n_fraud: scored.truth().iter().filter(|l| l.is_fraud()).count(),
            metrics: Metrics::from(&confusion),
            confusion,
            auc: roc.auc(),
            oob_accuracy: None,
            lookups,
            top_features: Vec::new(),
        };
        Ok((evaluation, roc))
    }

    /// Attach the model's out-of-bag accuracy.
    #[must_use]
    pub fn with_oob_accuracy(mut self, oob_accuracy: Option<f64>) -> Self {
        self.oob_accuracy = oob_accuracy;
        self
    }

    /// Attach the `n` highest-ranked features.
    #[must_use]
    pub fn with_top_features(mut self, ranked: &[RankedFeature], n: usize) -> Self {
        self.top_features = ranked.iter().take(n).map(FeatureWeight::from).collect();
        self
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} on {} ==", self.model, self.partition)?;
        writeln!(f, "records: {} ({} fraud)", self.n_records, self.n_fraud)?;
        write!(f, "{}", self.confusion)?;
        writeln!(
            f,
            "accuracy {:.4}  precision {:.4}  recall {:.4}  f1 {:.4}  specificity {:.4}",
            self.metrics.accuracy,
            self.metrics.precision,
            self.metrics.recall,
            self.metrics.f1,
            self.metrics.specificity
        )?;
        writeln!(f, "AUC: {:.4}", self.auc)?;
        if let Some(oob) = self.oob_accuracy {
            writeln!(f, "OOB accuracy: {oob:.4}")?;
        }
        for l in &self.lookups {
            writeln!(
                f,
                "record {}: p(fraud)={:.4} p(genuine)={:.4} predicted={} actual={}",
                l.position, l.p_fraud, l.p_genuine, l.predicted, l.actual
            )?;
        }
        if !self.top_features.is_empty() {
            let names: Vec<String> = self
                .top_features
                .iter()
                .map(|w| format!("{} ({:.3})", w.name, w.importance))
                .collect();
            writeln!(f, "top features: {}", names.join(", "))?;
        }
        Ok(())
    }
}

/// Record counts at each stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitSizes {
    /// Records read from the input file.
    pub loaded: usize,
    /// Records kept after subsampling.
    pub sampled: usize,
    /// Training partition.
    pub train: usize,
    /// Held-out test partition.
    pub test: usize,
    /// Estimation part of the training partition.
    pub estimation: usize,
    /// Validation part of the training partition.
    pub validation: usize,
}

/// The full output of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentReport {
    /// Experiment name.
    pub experiment: String,
    /// Master seed.
    pub seed: u64,
    /// Record counts per stage.
    pub sizes: SplitSizes,
    /// One entry per (model, partition) pair, in evaluation order.
    pub evaluations: Vec<Evaluation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use BinaryLabel::{Fraud, Genuine};

    fn scored() -> ScoredSplit {
        ScoredSplit::from_probabilities(&[Fraud, Genuine, Genuine, Fraud], &[0.9, 0.2, 0.6, 0.4])
            .unwrap()
    }

    #[test]
    fn summary_fields() {
        let (eval, roc) = Evaluation::from_scored("decision_tree", "validation", &scored(), &[0, 2])
            .unwrap();
        assert_eq!(eval.n_records, 4);
        assert_eq!(eval.n_fraud, 2);
        assert_eq!(eval.confusion.total(), 4);
        assert!((eval.auc - roc.auc()).abs() < f64::EPSILON);
        assert_eq!(eval.lookups.len(), 2);
        assert_eq!(eval.lookups[1].actual, Genuine);
        assert_eq!(eval.lookups[1].predicted, Fraud);
        assert!(eval.oob_accuracy.is_none());
    }

    #[test]
    fn lookup_past_end_fails() {
        let err = Evaluation::from_scored("m", "p", &scored(), &[4]).unwrap_err();
        assert!(matches!(err, EvalError::IndexOutOfBounds { index: 4, len: 4 }));
    }

    #[test]
    fn display_sections() {
        let ranked = vec![RankedFeature {
            name: "V14".to_string(),
            importance: 0.4,
            rank: 1,
        }];
        let (eval, _) = Evaluation::from_scored("random_forest", "test", &scored(), &[1]).unwrap();
        let text = eval
            .with_oob_accuracy(Some(0.97))
            .with_top_features(&ranked, 5)
            .to_string();
        assert!(text.contains("random_forest on test"));
        assert!(text.contains("AUC:"));
        assert!(text.contains("OOB accuracy: 0.9700"));
        assert!(text.contains("record 1:"));
        assert!(text.contains("V14 (0.400)"));
    }

    #[test]
    fn serializes_labels_lowercase() {
        let (eval, _) = Evaluation::from_scored("m", "p", &scored(), &[0]).unwrap();
        let json = serde_json::to_string(&eval).unwrap();
        assert!(json.contains("\"actual\":\"fraud\""));
        assert!(json.contains("\"fn\":"));
    }
}
