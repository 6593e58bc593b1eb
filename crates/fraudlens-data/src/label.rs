//! Binary class labels and the mapping from raw class values.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::DataError;
use crate::record::{Dataset, Transaction};

/// Binary transaction class.
///
/// The discriminant is the class index models train on. Fraud is index 0,
/// so argmax ties between the two classes resolve to fraud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryLabel {
    /// Fraudulent transaction; the positive class in every metric.
    Fraud = 0,
    /// Genuine transaction.
    Genuine = 1,
}

impl BinaryLabel {
    /// Number of classes.
    pub const N_CLASSES: usize = 2;

    /// Class index used by the models.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`BinaryLabel::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Fraud),
            1 => Some(Self::Genuine),
            _ => None,
        }
    }

    /// Return `true` for [`BinaryLabel::Fraud`].
    #[must_use]
    pub fn is_fraud(self) -> bool {
        self == Self::Fraud
    }

    /// Lowercase name used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fraud => "fraud",
            Self::Genuine => "genuine",
        }
    }
}

impl fmt::Display for BinaryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value a [`LabelNormalizer`] can map to a [`BinaryLabel`].
///
/// Implemented for raw strings and for `BinaryLabel` itself, which maps to
/// itself; normalizing twice therefore gives the same result as once.
pub trait ClassValue {
    /// Map this value under `normalizer`, or `None` if it is unrecognized.
    fn to_label(&self, normalizer: &LabelNormalizer) -> Option<BinaryLabel>;
}

impl ClassValue for str {
    fn to_label(&self, normalizer: &LabelNormalizer) -> Option<BinaryLabel> {
        let value = self.trim();
        if value == normalizer.fraud {
            Some(BinaryLabel::Fraud)
        } else if value == normalizer.genuine {
            Some(BinaryLabel::Genuine)
        } else {
            None
        }
    }
}

impl ClassValue for BinaryLabel {
    fn to_label(&self, _normalizer: &LabelNormalizer) -> Option<BinaryLabel> {
        Some(*self)
    }
}

/// Maps raw class values onto [`BinaryLabel`].
///
/// # Defaults
///
/// | Label | Raw value |
/// |---|---|
/// | fraud | `"1"` |
/// | genuine | `"0"` |
///
/// Values are compared after trimming surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelNormalizer {
    fraud: String,
    genuine: String,
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self {
            fraud: "1".to_string(),
            genuine: "0".to_string(),
        }
    }
}

impl LabelNormalizer {
    /// Create a normalizer with explicit raw values for each class.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidLabelVocabulary`] if either value is empty
    /// after trimming or both are equal.
    pub fn new(fraud: &str, genuine: &str) -> Result<Self, DataError> {
        let (f, g) = (fraud.trim(), genuine.trim());
        if f.is_empty() || g.is_empty() || f == g {
            return Err(DataError::InvalidLabelVocabulary {
                fraud: fraud.to_string(),
                genuine: genuine.to_string(),
            });
        }
        Ok(Self {
            fraud: f.to_string(),
            genuine: g.to_string(),
        })
    }

    /// Raw value that marks fraud.
    #[must_use]
    pub fn fraud_value(&self) -> &str {
        &self.fraud
    }

    /// Raw value that marks a genuine transaction.
    #[must_use]
    pub fn genuine_value(&self) -> &str {
        &self.genuine
    }

    /// Map a single value, or `None` if it is unrecognized.
    pub fn normalize<V: ClassValue + ?Sized>(&self, value: &V) -> Option<BinaryLabel> {
        value.to_label(self)
    }

    /// Attach a binary label to every record of `dataset`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownLabel`] for the first record whose class
    /// value matches neither configured value.
    #[instrument(skip(self, dataset), fields(n = dataset.len()))]
    pub fn label(&self, dataset: Dataset) -> Result<LabeledSplit, DataError> {
        let records = dataset.into_records();
        let labels = records
            .iter()
            .map(|r| {
                self.normalize(r.class())
                    .ok_or_else(|| DataError::UnknownLabel {
                        value: r.class().to_string(),
                        row: r.row(),
                        fraud: self.fraud.clone(),
                        genuine: self.genuine.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let split = LabeledSplit { records, labels };
        debug!(n_fraud = split.n_fraud(), "labeled split");
        Ok(split)
    }
}

/// Transactions paired with their binary labels, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSplit {
    records: Vec<Transaction>,
    labels: Vec<BinaryLabel>,
}

impl LabeledSplit {
    /// Transactions in order.
    #[must_use]
    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    /// Labels aligned with [`LabeledSplit::records`].
    #[must_use]
    pub fn labels(&self) -> &[BinaryLabel] {
        &self.labels
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` if the split is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of fraud records.
    #[must_use]
    pub fn n_fraud(&self) -> usize {
        self.labels.iter().filter(|l| l.is_fraud()).count()
    }

    /// Row-major model input matrix.
    #[must_use]
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.records.iter().map(Transaction::feature_vector).collect()
    }

    /// Class indices aligned with [`LabeledSplit::features`].
    #[must_use]
    pub fn label_indices(&self) -> Vec<usize> {
        self.labels.iter().map(|l| l.index()).collect()
    }
}
