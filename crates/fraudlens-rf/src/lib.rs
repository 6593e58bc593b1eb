//! Tree classifiers for imbalanced binary data: train, predict, explain.
//!
//! A CART decision tree grown with exact threshold search, and a random
//! forest that bags such trees in parallel with rayon and can score itself
//! out of bag. Both sit behind [`Trainer`] / [`Classifier`], so callers score
//! either one the same way, and both report mean-decrease-in-impurity
//! feature importances.

mod classifier;
mod config;
mod error;
mod forest;
mod importance;
mod node;
mod oob;
mod split;
mod tree;
mod validate;

pub use classifier::{ClassDistribution, Classifier, Trainer};
pub use config::{DecisionTreeConfig, MaxFeatures, OobMode, RandomForestConfig, TreeParams};
pub use error::RfError;
pub use forest::{RandomForest, RandomForestResult};
pub use importance::{RankedFeature, rank_features};
pub use node::Node;
pub use oob::OobScore;
pub use split::Criterion;
pub use tree::DecisionTree;
