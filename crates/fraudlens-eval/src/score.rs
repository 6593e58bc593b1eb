//! Per-record class probabilities and hard predictions.

use fraudlens_data::{BinaryLabel, LabeledSplit};
use fraudlens_rf::{ClassDistribution, Classifier};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument};

use crate::EvalError;
use crate::confusion::BinaryConfusion;
use crate::roc::{RocCurve, check_probabilities};

/// A model's verdict on one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    /// Argmax class; an exact tie goes to fraud.
    pub predicted: BinaryLabel,
    /// Probability of fraud, in [0, 1].
    pub p_fraud: f64,
    /// Probability of a genuine transaction, `1 - p_fraud`.
    pub p_genuine: f64,
}

impl Score {
    /// Read a binary verdict off a model's class distribution.
    fn from_distribution(dist: &ClassDistribution) -> Result<Self, EvalError> {
        let predicted = BinaryLabel::from_index(dist.predicted_class()).ok_or(EvalError::NotBinary {
            got: dist.as_slice().len(),
        })?;
        Ok(Self {
            predicted,
            p_fraud: dist.probability(BinaryLabel::Fraud.index()),
            p_genuine: dist.probability(BinaryLabel::Genuine.index()),
        })
    }
}

/// Scores for every record of a split, aligned with its true labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSplit {
    truth: Vec<BinaryLabel>,
    scores: Vec<Score>,
}

impl ScoredSplit {
    /// Build from true labels and externally computed fraud probabilities.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::LengthMismatch`] | Slices differ in length |
    /// | [`EvalError::InvalidProbability`] | A score is not a finite value in [0, 1] |
    pub fn from_probabilities(truth: &[BinaryLabel], p_fraud: &[f64]) -> Result<Self, EvalError> {
        if truth.len() != p_fraud.len() {
            return Err(EvalError::LengthMismatch {
                expected: truth.len(),
                got: p_fraud.len(),
            });
        }
        check_probabilities(p_fraud)?;
        let scores = p_fraud
            .iter()
            .map(|&p| Score::from_distribution(&ClassDistribution::new(vec![p, 1.0 - p])))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            truth: truth.to_vec(),
            scores,
        })
    }

    /// Number of scored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Return `true` if nothing was scored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Scores in record order.
    #[must_use]
    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    /// True labels in record order.
    #[must_use]
    pub fn truth(&self) -> &[BinaryLabel] {
        &self.truth
    }

    /// The score at record `position`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::IndexOutOfBounds`] if `position >= self.len()`.
    pub fn lookup(&self, position: usize) -> Result<&Score, EvalError> {
        self.scores.get(position).ok_or(EvalError::IndexOutOfBounds {
            index: position,
            len: self.scores.len(),
        })
    }

    /// Hard predictions in record order.
    #[must_use]
    pub fn predicted(&self) -> Vec<BinaryLabel> {
        self.scores.iter().map(|s| s.predicted).collect()
    }

    /// Fraud probabilities in record order.
    #[must_use]
    pub fn p_fraud(&self) -> Vec<f64> {
        self.scores.iter().map(|s| s.p_fraud).collect()
    }

    /// Confusion matrix of the hard predictions.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::EmptyInput`] for an empty split.
    pub fn confusion(&self) -> Result<BinaryConfusion, EvalError> {
        BinaryConfusion::from_labels(&self.truth, &self.predicted())
    }

    /// ROC curve of the fraud probabilities.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::EmptyInput`] or [`EvalError::SingleClass`] when
    /// the curve is undefined.
    pub fn roc(&self) -> Result<RocCurve, EvalError> {
        RocCurve::from_scores(&self.truth, &self.p_fraud())
    }
}

/// Score every record of `split` with `model`, in parallel.
///
/// The model must have been trained on [`BinaryLabel::index`] labels.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EvalError::NotBinary`] | Model does not report exactly two classes |
/// | [`EvalError::Predict`] | Model rejects a record's feature vector |
#[instrument(skip_all, fields(n = split.len()))]
pub fn score<C: Classifier + ?Sized>(model: &C, split: &LabeledSplit) -> Result<ScoredSplit, EvalError> {
    if model.n_classes() != BinaryLabel::N_CLASSES {
        return Err(EvalError::NotBinary {
            got: model.n_classes(),
        });
    }

    let scores = split
        .records()
        .par_iter()
        .map(|record| -> Result<Score, EvalError> {
            let dist = model.predict_proba(&record.feature_vector())?;
            Score::from_distribution(&dist)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let scored = ScoredSplit {
        truth: split.labels().to_vec(),
        scores,
    };
    info!(
        n_scored = scored.len(),
        n_flagged = scored.scores.iter().filter(|s| s.predicted.is_fraud()).count(),
        "split scored"
    );
    Ok(scored)
}
