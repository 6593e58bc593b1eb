//! Binary confusion matrix with fraud as the positive class.

use std::fmt;

use fraudlens_data::BinaryLabel;
use serde::Serialize;

use crate::EvalError;

/// Counts of correct and incorrect binary predictions.
///
/// Fraud is the positive class: a true positive is a fraud record predicted
/// as fraud, a false positive is a genuine record predicted as fraud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinaryConfusion {
    tp: usize,
    fp: usize,
    #[serde(rename = "fn")]
    fn_: usize,
    tn: usize,
}

impl BinaryConfusion {
    /// Tally `truth` against `predicted`, position by position.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyInput`] | Zero labels provided |
    /// | [`EvalError::LengthMismatch`] | Slices differ in length |
    pub fn from_labels(truth: &[BinaryLabel], predicted: &[BinaryLabel]) -> Result<Self, EvalError> {
        if truth.is_empty() {
            return Err(EvalError::EmptyInput);
        }
        if truth.len() != predicted.len() {
            return Err(EvalError::LengthMismatch {
                expected: truth.len(),
                got: predicted.len(),
            });
        }

        let mut cm = Self {
            tp: 0,
            fp: 0,
            fn_: 0,
            tn: 0,
        };
        for (&t, &p) in truth.iter().zip(predicted) {
            match (t.is_fraud(), p.is_fraud()) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (false, false) => cm.tn += 1,
            }
        }
        Ok(cm)
    }

    /// Fraud predicted as fraud.
    #[must_use]
    pub fn true_positives(&self) -> usize {
        self.tp
    }

    /// Genuine predicted as fraud.
    #[must_use]
    pub fn false_positives(&self) -> usize {
        self.fp
    }

    /// Fraud predicted as genuine.
    #[must_use]
    pub fn false_negatives(&self) -> usize {
        self.fn_
    }

    /// Genuine predicted as genuine.
    #[must_use]
    pub fn true_negatives(&self) -> usize {
        self.tn
    }

    /// Total number of tallied records.
    #[must_use]
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    /// Proportion of correct predictions.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// TP / (TP + FP). 0.0 if nothing was predicted as fraud.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// TP / (TP + FN), the fraud detection rate. 0.0 if no fraud is present.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Harmonic mean of precision and recall. 0.0 if both are zero.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// TN / (TN + FP). 0.0 if no genuine record is present.
    #[must_use]
    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for BinaryConfusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>12} {:>12}", "", "pred_fraud", "pred_genuine")?;
        writeln!(f, "{:>14} {:>12} {:>12}", "true_fraud", self.tp, self.fn_)?;
        writeln!(f, "{:>14} {:>12} {:>12}", "true_genuine", self.fp, self.tn)
    }
}
