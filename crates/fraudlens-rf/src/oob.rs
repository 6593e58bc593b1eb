//! Out-of-bag accuracy: each training row scored only by trees that never drew it.

use rayon::prelude::*;

use crate::classifier::ClassDistribution;
use crate::error::RfError;
use crate::forest::Bag;
use crate::tree::DecisionTree;

/// Forest accuracy estimated on rows left out of each tree's bootstrap draw.
#[derive(Debug, Clone, PartialEq)]
pub struct OobScore {
    /// Share of scored rows whose averaged out-of-bag vote matches the label.
    pub accuracy: f64,
    /// Rows left out of at least one draw; rows drawn by every tree are skipped.
    pub n_oob_samples: usize,
    /// `confusion[true][predicted]` over the scored rows.
    pub confusion: Vec<Vec<usize>>,
}

pub(crate) fn out_of_bag(
    trees: &[DecisionTree],
    bags: &[Bag],
    features: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
) -> Result<OobScore, RfError> {
    let votes = (0..features.len())
        .into_par_iter()
        .map(|row| -> Result<Option<usize>, RfError> {
            let mut sum = vec![0.0; n_classes];
            let mut n_voters = 0usize;
            for (tree, bag) in trees.iter().zip(bags) {
                if bag.contains(row) {
                    continue;
                }
                for (acc, p) in sum.iter_mut().zip(tree.leaf_distribution(&features[row])?) {
                    *acc += p;
                }
                n_voters += 1;
            }
            Ok((n_voters > 0).then(|| ClassDistribution::new(sum).predicted_class()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut confusion = vec![vec![0usize; n_classes]; n_classes];
    for (vote, &label) in votes.iter().zip(labels) {
        if let Some(predicted) = vote {
            confusion[label][*predicted] += 1;
        }
    }
    let n_oob_samples = votes.iter().flatten().count();
    if n_oob_samples == 0 {
        return Err(RfError::NoOutOfBagRows);
    }
    let correct: usize = (0..n_classes).map(|c| confusion[c][c]).sum();

    Ok(OobScore {
        accuracy: correct as f64 / n_oob_samples as f64,
        n_oob_samples,
        confusion,
    })
}
