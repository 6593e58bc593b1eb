//! Shared input checks for tree and forest training.

use crate::error::RfError;

/// Dimensions of a feature matrix that passed [`validate_training_set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrainingShape {
    pub(crate) n_samples: usize,
    pub(crate) n_features: usize,
    /// `max(label) + 1`; labels are zero-based class indices.
    pub(crate) n_classes: usize,
}

/// Validate a row-major feature matrix and its labels.
///
/// Checks, in order: non-empty, at least one column, one label per row,
/// rectangular rows, finite values, and at least two distinct classes.
pub(crate) fn validate_training_set(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<TrainingShape, RfError> {
    let Some(first) = features.first() else {
        return Err(RfError::EmptyTrainingSet);
    };
    let n_samples = features.len();
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::NoFeatures);
    }
    if labels.len() != n_samples {
        return Err(RfError::LabelCountMismatch {
            rows: n_samples,
            labels: labels.len(),
        });
    }

    for (row, values) in features.iter().enumerate() {
        if values.len() != n_features {
            return Err(RfError::RaggedRow {
                row,
                expected: n_features,
                got: values.len(),
            });
        }
        if let Some(column) = values.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue { row, column });
        }
    }

    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    let mut seen = vec![false; n_classes];
    for &label in labels {
        seen[label] = true;
    }
    let observed = seen.iter().filter(|&&s| s).count();
    if observed < 2 {
        return Err(RfError::DegenerateLabels { observed });
    }

    Ok(TrainingShape {
        n_samples,
        n_features,
        n_classes,
    })
}

/// Transpose a validated row-major matrix so split search can walk one column at a time.
pub(crate) fn to_columns(features: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|col| features.iter().map(|row| row[col]).collect())
        .collect()
}
