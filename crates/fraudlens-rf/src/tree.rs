//! CART growth and the fitted single tree.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::RfError;
use crate::classifier::{ClassDistribution, Classifier, Trainer};
use crate::config::{DecisionTreeConfig, invalid};
use crate::importance::normalize;
use crate::node::Node;
use crate::split::SplitSearch;
use crate::validate::{to_columns, validate_training_set};

impl DecisionTreeConfig {
    /// Fit a tree on row-major `features` with zero-based class `labels`.
    ///
    /// # Errors
    ///
    /// Input problems (empty, ragged, non-finite, mismatched lengths),
    /// [`RfError::DegenerateLabels`] when only one class is present, and
    /// [`RfError::InvalidHyperparameter`] for out-of-range settings.
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        let shape = validate_training_set(features, labels)?;
        let columns = to_columns(features, shape.n_features);
        self.grow(&columns, labels, (0..shape.n_samples).collect(), shape.n_classes)
    }

    /// Grow on a column-major matrix from the root row set `rows`.
    ///
    /// `n_classes` comes from the caller so every tree in a forest emits
    /// distributions of one length, even when a bootstrap draw misses a class.
    pub(crate) fn grow(
        &self,
        columns: &[Vec<f64>],
        labels: &[usize],
        rows: Vec<usize>,
        n_classes: usize,
    ) -> Result<DecisionTree, RfError> {
        self.params.check()?;
        let n_features = columns.len();
        let n_candidates = self.max_features.unwrap_or(n_features);
        if n_candidates == 0 || n_candidates > n_features {
            return Err(invalid(
                "max_features",
                n_candidates,
                "between 1 and the number of features",
            ));
        }

        let search = SplitSearch {
            columns,
            labels,
            n_classes,
            criterion: self.params.criterion,
            n_candidates,
            min_leaf: self.params.min_samples_leaf,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut nodes = vec![Node::pending()];
        let mut stack = vec![(0usize, rows, 0usize)];
        while let Some((slot, rows, depth)) = stack.pop() {
            let mut counts = vec![0usize; n_classes];
            for &r in &rows {
                counts[labels[r]] += 1;
            }
            let impurity = self.params.criterion.impurity(&counts);

            let splittable = impurity > 0.0
                && rows.len() >= self.params.min_samples_split
                && self.params.max_depth.is_none_or(|max| depth < max);
            let cut = if splittable {
                search.best_cut(&rows, &counts, &mut rng)
            } else {
                None
            };

            nodes[slot] = match cut {
                None => Node::leaf(&counts, impurity),
                Some(cut) => {
                    let values = &columns[cut.feature];
                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
                        rows.iter().partition(|&&r| values[r] <= cut.threshold);
                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::pending());
                    nodes.push(Node::pending());
                    // Right first so the left subtree is grown next.
                    stack.push((right, right_rows, depth + 1));
                    stack.push((left, left_rows, depth + 1));
                    Node::Branch {
                        feature: cut.feature,
                        threshold: cut.threshold,
                        left,
                        right,
                        n_samples: rows.len(),
                        impurity,
                        gain: cut.gain,
                    }
                }
            };
        }

        let tree = DecisionTree {
            nodes,
            n_features,
            n_classes,
        };
        debug!(
            n_nodes = tree.n_nodes(),
            n_leaves = tree.n_leaves(),
            depth = tree.depth(),
            "tree grown"
        );
        Ok(tree)
    }
}

impl Trainer for DecisionTreeConfig {
    type Model = DecisionTree;

    fn name(&self) -> &'static str {
        "decision_tree"
    }

    fn train(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        self.fit(features, labels)
    }
}

/// A fitted CART tree, stored as a flat node arena rooted at entry 0.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

impl DecisionTree {
    /// Class proportions of the leaf `sample` lands in.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InputWidth`] when `sample` has the wrong length.
    pub fn leaf_distribution(&self, sample: &[f64]) -> Result<&[f64], RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::InputWidth {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { proba, .. } => return Ok(proba),
                Node::Branch {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => at = if sample[*feature] <= *threshold { *left } else { *right },
            }
        }
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path; a single-leaf tree has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Branch { left, right, .. } = node {
                level[*left] = level[i] + 1;
                level[*right] = level[i] + 1;
            }
        }
        level.into_iter().max().unwrap_or(0)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl Classifier for DecisionTree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError> {
        self.leaf_distribution(sample)
            .map(|p| ClassDistribution::new(p.to_vec()))
    }

    fn feature_importances(&self) -> Vec<f64> {
        let mut gains = vec![0.0; self.n_features];
        for node in &self.nodes {
            if let Node::Branch { feature, gain, .. } = node {
                gains[*feature] += gain;
            }
        }
        normalize(gains)
    }
}
