//! Bagged forest: parallel training, averaged prediction, out-of-bag scoring.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::classifier::{ClassDistribution, Classifier, Trainer};
use crate::config::{DecisionTreeConfig, OobMode, RandomForestConfig, invalid};
use crate::error::RfError;
use crate::importance::normalize;
use crate::oob::{OobScore, out_of_bag};
use crate::tree::DecisionTree;
use crate::validate::{to_columns, validate_training_set};

/// One tree's bootstrap draw: row positions with repeats, plus membership.
pub(crate) struct Bag {
    drawn: Vec<usize>,
    in_bag: Vec<bool>,
}

impl Bag {
    fn draw<R: Rng + ?Sized>(n_rows: usize, n_draws: usize, rng: &mut R) -> Self {
        let mut in_bag = vec![false; n_rows];
        let drawn = (0..n_draws)
            .map(|_| {
                let row = rng.gen_range(0..n_rows);
                in_bag[row] = true;
                row
            })
            .collect();
        Self { drawn, in_bag }
    }

    pub(crate) fn contains(&self, row: usize) -> bool {
        self.in_bag[row]
    }
}

impl RandomForestConfig {
    /// Fit the forest on row-major `features` with zero-based class `labels`.
    ///
    /// Trees grow in parallel; each gets its own seed drawn from the master
    /// seed, so results do not depend on the thread count.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyTrainingSet`], [`RfError::RaggedRow`], ... | Malformed input |
    /// | [`RfError::DegenerateLabels`] | Only one class present |
    /// | [`RfError::InvalidHyperparameter`] | `max_features`, `bootstrap_fraction` or tree limits out of range |
    /// | [`RfError::NoOutOfBagRows`] | OOB enabled but every row was drawn by every tree |
    #[instrument(skip_all, fields(n_trees = self.n_trees, n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForestResult, RfError> {
        let shape = validate_training_set(features, labels)?;
        self.params.check()?;
        let max_features = self.max_features.resolve(shape.n_features)?;
        if !(self.bootstrap_fraction > 0.0 && self.bootstrap_fraction <= 1.0) {
            return Err(invalid(
                "bootstrap_fraction",
                self.bootstrap_fraction,
                "in (0, 1]",
            ));
        }
        let n_draws = (shape.n_samples as f64 * self.bootstrap_fraction).ceil() as usize;

        info!(
            n_features = shape.n_features,
            n_classes = shape.n_classes,
            max_features,
            n_draws,
            "training random forest"
        );

        let columns = to_columns(features, shape.n_features);
        let mut master = ChaCha8Rng::seed_from_u64(self.seed);
        let seeds: Vec<u64> = (0..self.n_trees).map(|_| master.r#gen()).collect();

        let grown: Vec<(DecisionTree, Bag)> = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let bag = Bag::draw(shape.n_samples, n_draws, &mut rng);
                let tree = DecisionTreeConfig::new()
                    .with_params(self.params)
                    .with_max_features(Some(max_features))
                    .with_seed(rng.r#gen())
                    .grow(&columns, labels, bag.drawn.clone(), shape.n_classes)?;
                Ok((tree, bag))
            })
            .collect::<Result<_, RfError>>()?;
        let (trees, bags): (Vec<_>, Vec<_>) = grown.into_iter().unzip();

        debug!(
            mean_depth = trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / trees.len() as f64,
            mean_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>() as f64 / trees.len() as f64,
            "trees grown"
        );

        let oob = match self.oob_mode {
            OobMode::Enabled => Some(out_of_bag(&trees, &bags, features, labels, shape.n_classes)?),
            OobMode::Disabled => None,
        };
        info!(
            oob_accuracy = oob.as_ref().map(|s| s.accuracy),
            "random forest trained"
        );

        Ok(RandomForestResult {
            forest: RandomForest {
                trees,
                n_features: shape.n_features,
                n_classes: shape.n_classes,
            },
            oob,
            max_features,
        })
    }
}

impl Trainer for RandomForestConfig {
    type Model = RandomForestResult;

    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn train(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<RandomForestResult, RfError> {
        self.fit(features, labels)
    }
}

/// A fitted ensemble whose probabilities are the mean of its trees' leaf proportions.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    /// Probabilities for many rows at once, in parallel, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InputWidth`] if any row has the wrong length.
    pub fn predict_proba_batch(
        &self,
        features: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, RfError> {
        features.par_iter().map(|row| self.predict_proba(row)).collect()
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError> {
        let mut mean = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in mean.iter_mut().zip(tree.leaf_distribution(sample)?) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(ClassDistribution::new(mean.into_iter().map(|v| v / n).collect()))
    }

    /// Per-tree importances summed and renormalized.
    fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (t, v) in totals.iter_mut().zip(tree.feature_importances()) {
                *t += v;
            }
        }
        normalize(totals)
    }
}

/// A trained forest together with what was measured while training it.
///
/// Scores like the forest itself.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    oob: Option<OobScore>,
    max_features: usize,
}

impl RandomForestResult {
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// `Some` only when trained with [`OobMode::Enabled`].
    #[must_use]
    pub fn oob_score(&self) -> Option<&OobScore> {
        self.oob.as_ref()
    }

    /// Candidate columns per split after resolving [`crate::MaxFeatures`].
    #[must_use]
    pub fn max_features(&self) -> usize {
        self.max_features
    }
}

impl Classifier for RandomForestResult {
    fn n_features(&self) -> usize {
        self.forest.n_features
    }

    fn n_classes(&self) -> usize {
        self.forest.n_classes
    }

    fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError> {
        self.forest.predict_proba(sample)
    }

    fn feature_importances(&self) -> Vec<f64> {
        self.forest.feature_importances()
    }

    fn oob_accuracy(&self) -> Option<f64> {
        self.oob.as_ref().map(|s| s.accuracy)
    }
}
