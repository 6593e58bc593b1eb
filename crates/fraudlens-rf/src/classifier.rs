//! The seam between model training and scoring.
//!
//! [`Trainer`] turns a labeled feature matrix into a fitted model;
//! [`Classifier`] is everything the scorer needs from that model.

use crate::error::RfError;

/// Class probability distribution for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    /// Wrap per-class probabilities, indexed by class.
    #[must_use]
    pub fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Return the predicted class: the argmax of the distribution.
    ///
    /// Ties go to the lowest class index.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        let mut best = 0;
        for (class, &p) in self.probs.iter().enumerate().skip(1) {
            if p > self.probs[best] {
                best = class;
            }
        }
        best
    }

    /// Return the probability of `class`, or 0.0 for a class the model never saw.
    #[must_use]
    pub fn probability(&self, class: usize) -> f64 {
        self.probs.get(class).copied().unwrap_or(0.0)
    }

    /// Return the probability distribution as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }
}

/// A fitted model that maps a feature vector to class probabilities.
pub trait Classifier: Send + Sync {
    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;

    /// Number of classes in the model's output distribution.
    fn n_classes(&self) -> usize;

    /// Class probabilities for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InputWidth`] when `sample.len() != n_features`.
    fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError>;

    /// Hard class prediction for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InputWidth`] when `sample.len() != n_features`.
    fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.predict_proba(sample)?.predicted_class())
    }

    /// Mean-decrease-in-impurity importance per feature, summing to 1.0
    /// (all zeros when the model never split).
    fn feature_importances(&self) -> Vec<f64>;

    /// Out-of-bag accuracy, for models that estimate one during training.
    fn oob_accuracy(&self) -> Option<f64> {
        None
    }
}

/// A training configuration that produces a [`Classifier`].
pub trait Trainer {
    /// The fitted model type.
    type Model: Classifier;

    /// Short name used in logs and report file names.
    fn name(&self) -> &'static str;

    /// Fit a model on row-major `features` with zero-based class `labels`.
    ///
    /// # Errors
    ///
    /// Any [`RfError`] raised by input or configuration validation, including
    /// [`RfError::DegenerateLabels`] when fewer than two classes are present.
    fn train(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<Self::Model, RfError>;
}

#[cfg(test)]
mod tests {
    use super::ClassDistribution;

    #[test]
    fn argmax_picks_larger_probability() {
        let dist = ClassDistribution::new(vec![0.2, 0.8]);
        assert_eq!(dist.predicted_class(), 1);
    }

    #[test]
    fn tie_resolves_to_lowest_class() {
        let dist = ClassDistribution::new(vec![0.5, 0.5]);
        assert_eq!(dist.predicted_class(), 0);
    }

    #[test]
    fn unseen_class_has_zero_probability() {
        let dist = ClassDistribution::new(vec![1.0]);
        assert!((dist.probability(1) - 0.0).abs() < f64::EPSILON);
        assert!((dist.probability(0) - 1.0).abs() < f64::EPSILON);
    }
}
