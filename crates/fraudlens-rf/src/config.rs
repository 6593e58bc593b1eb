//! Training configuration for the single tree and the forest.
//!
//! Growth limits shared by both models live in [`TreeParams`]; each model
//! config embeds one and adds its own sampling knobs.

use crate::error::RfError;
use crate::split::Criterion;

/// Limits on how far a tree is grown.
///
/// # Defaults
///
/// | Parameter           | Default            |
/// |---------------------|--------------------|
/// | `criterion`         | `Gini`             |
/// | `max_depth`         | `None` (unlimited) |
/// | `min_samples_split` | 2                  |
/// | `min_samples_leaf`  | 1                  |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub(crate) criterion: Criterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
}

impl TreeParams {
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: Criterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }

    /// Impurity measure minimized by each split.
    #[must_use]
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Deepest level a node may sit at (root is 0). `None` grows until
    /// leaves are pure or no admissible split remains.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nodes with fewer rows than this become leaves.
    #[must_use]
    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    /// Splits leaving fewer rows than this on either side are skipped.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n;
        self
    }

    #[must_use]
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    pub(crate) fn check(&self) -> Result<(), RfError> {
        if self.max_depth == Some(0) {
            return Err(invalid("max_depth", 0, "at least 1, or unlimited"));
        }
        if self.min_samples_split < 2 {
            return Err(invalid("min_samples_split", self.min_samples_split, "at least 2"));
        }
        if self.min_samples_leaf == 0 {
            return Err(invalid("min_samples_leaf", 0, "at least 1"));
        }
        Ok(())
    }
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn invalid(name: &'static str, value: impl ToString, expected: &'static str) -> RfError {
    RfError::InvalidHyperparameter {
        name,
        value: value.to_string(),
        expected,
    }
}

/// Settings for a single CART tree.
///
/// # Defaults
///
/// | Parameter      | Default                  |
/// |----------------|--------------------------|
/// | `params`       | [`TreeParams::default`]  |
/// | `max_features` | `None` (every feature)   |
/// | `seed`         | 42                       |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) params: TreeParams,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: TreeParams::new(),
            max_features: None,
            seed: 42,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: TreeParams) -> Self {
        self.params = params;
        self
    }

    /// Candidate columns drawn at each node. `None` tries them all, which
    /// makes the tree independent of the seed.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How many candidate columns each forest node examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`; 6 of the 30 transaction columns.
    Sqrt,
    /// Exactly this many.
    Fixed(usize),
    /// Every column, which turns the forest into plain bagging.
    All,
}

impl MaxFeatures {
    /// Number of candidates for a matrix `n_features` wide.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidHyperparameter`] if the count is zero or
    /// wider than the matrix.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Fixed(k) => k,
            MaxFeatures::All => n_features,
        };
        if k == 0 || k > n_features {
            return Err(invalid("max_features", k, "between 1 and the number of features"));
        }
        Ok(k)
    }
}

/// Whether the forest scores each row with the trees that never saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OobMode {
    Enabled,
    Disabled,
}

/// Settings for a bagged forest of CART trees.
///
/// # Defaults
///
/// | Parameter            | Default                 |
/// |----------------------|-------------------------|
/// | `params`             | [`TreeParams::default`] |
/// | `max_features`       | `Sqrt`                  |
/// | `bootstrap_fraction` | 1.0                     |
/// | `oob_mode`           | `Disabled`              |
/// | `seed`               | 42                      |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) params: TreeParams,
    pub(crate) max_features: MaxFeatures,
    pub(crate) bootstrap_fraction: f64,
    pub(crate) oob_mode: OobMode,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Start a config for `n_trees` trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidHyperparameter`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(invalid("n_trees", n_trees, "at least 1"));
        }
        Ok(Self {
            n_trees,
            params: TreeParams::new(),
            max_features: MaxFeatures::Sqrt,
            bootstrap_fraction: 1.0,
            oob_mode: OobMode::Disabled,
            seed: 42,
        })
    }

    #[must_use]
    pub fn with_params(mut self, params: TreeParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Size of each bootstrap draw relative to the training set, in (0, 1].
    #[must_use]
    pub fn with_bootstrap_fraction(mut self, fraction: f64) -> Self {
        self.bootstrap_fraction = fraction;
        self
    }

    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.oob_mode = oob_mode;
        self
    }

    /// Master seed; every tree's bootstrap and feature draws derive from it.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    #[must_use]
    pub fn bootstrap_fraction(&self) -> f64 {
        self.bootstrap_fraction
    }

    #[must_use]
    pub fn oob_mode(&self) -> OobMode {
        self.oob_mode
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}
