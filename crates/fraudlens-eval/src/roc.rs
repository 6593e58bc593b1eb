//! ROC curve and trapezoidal AUC over fraud probabilities.

use fraudlens_data::BinaryLabel;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::EvalError;

/// One operating point of a [`RocCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    /// Records with `p_fraud >= threshold` are predicted fraud.
    pub threshold: f64,
    /// False positive rate: FP / (FP + TN).
    pub fpr: f64,
    /// True positive rate: TP / (TP + FN).
    pub tpr: f64,
}

/// Receiver operating characteristic of a fraud score.
///
/// Thresholds are `+inf` followed by every distinct score in descending
/// order, so the curve starts at (0, 0) and ends at (1, 1). Tied scores move
/// together and produce a single diagonal step.
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    points: Vec<RocPoint>,
}

impl RocCurve {
    /// Sweep the threshold over `p_fraud` against the `truth` labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyInput`] | Zero records |
    /// | [`EvalError::LengthMismatch`] | `p_fraud` length differs from `truth` |
    /// | [`EvalError::InvalidProbability`] | A score is not a finite value in [0, 1] |
    /// | [`EvalError::SingleClass`] | Only one class present |
    #[instrument(skip_all, fields(n = truth.len()))]
    pub fn from_scores(truth: &[BinaryLabel], p_fraud: &[f64]) -> Result<Self, EvalError> {
        if truth.is_empty() {
            return Err(EvalError::EmptyInput);
        }
        if truth.len() != p_fraud.len() {
            return Err(EvalError::LengthMismatch {
                expected: truth.len(),
                got: p_fraud.len(),
            });
        }
        check_probabilities(p_fraud)?;

        let n_pos = truth.iter().filter(|l| l.is_fraud()).count();
        let n_neg = truth.len() - n_pos;
        if n_pos == 0 || n_neg == 0 {
            return Err(EvalError::SingleClass {
                class: truth[0],
                n_samples: truth.len(),
            });
        }

        let mut order: Vec<usize> = (0..truth.len()).collect();
        order.sort_by(|&a, &b| p_fraud[b].total_cmp(&p_fraud[a]));

        let mut points = Vec::with_capacity(truth.len() + 1);
        points.push(RocPoint {
            threshold: f64::INFINITY,
            fpr: 0.0,
            tpr: 0.0,
        });

        let (mut tp, mut fp) = (0usize, 0usize);
        let mut i = 0;
        while i < order.len() {
            let threshold = p_fraud[order[i]];
            while i < order.len() && p_fraud[order[i]] == threshold {
                if truth[order[i]].is_fraud() {
                    tp += 1;
                } else {
                    fp += 1;
                }
                i += 1;
            }
            points.push(RocPoint {
                threshold,
                fpr: fp as f64 / n_neg as f64,
                tpr: tp as f64 / n_pos as f64,
            });
        }

        debug!(n_points = points.len(), "ROC curve computed");
        Ok(Self { points })
    }

    /// Operating points from `(0, 0)` to `(1, 1)`.
    #[must_use]
    pub fn points(&self) -> &[RocPoint] {
        &self.points
    }

    /// Area under the curve by the trapezoidal rule.
    ///
    /// 1.0 means every fraud record outscores every genuine one; 0.5 is
    /// chance level.
    #[must_use]
    pub fn auc(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
            .sum()
    }
}

/// Reject the first score that is NaN, infinite, or outside [0, 1].
pub(crate) fn check_probabilities(p_fraud: &[f64]) -> Result<(), EvalError> {
    match p_fraud.iter().position(|p| !(0.0..=1.0).contains(p)) {
        Some(index) => Err(EvalError::InvalidProbability {
            index,
            value: p_fraud[index],
        }),
        None => Ok(()),
    }
}
