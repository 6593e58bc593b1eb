/// One entry of a tree's node arena.
///
/// Children always sit at higher arena positions than their parent, so the
/// root is entry 0 and a forward pass visits parents first.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Sends a row left when `row[feature] <= threshold`, right otherwise.
    Branch {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Training rows that reached this node.
        n_samples: usize,
        /// Impurity before the split.
        impurity: f64,
        /// Weighted impurity decrease, summed per feature for importance.
        gain: f64,
    },
    /// Class proportions of the training rows that ended here.
    Leaf {
        proba: Vec<f64>,
        n_samples: usize,
        impurity: f64,
    },
}

impl Node {
    pub(crate) fn leaf(counts: &[usize], impurity: f64) -> Self {
        let n_samples: usize = counts.iter().sum();
        let total = n_samples.max(1) as f64;
        Node::Leaf {
            proba: counts.iter().map(|&c| c as f64 / total).collect(),
            n_samples,
            impurity,
        }
    }

    /// Arena slot reserved for a child that has not been grown yet.
    pub(crate) fn pending() -> Self {
        Node::Leaf {
            proba: Vec::new(),
            n_samples: 0,
            impurity: 0.0,
        }
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Branch { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    #[must_use]
    pub fn impurity(&self) -> f64 {
        match self {
            Node::Branch { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::Node;

    #[test]
    fn leaf_proportions_from_counts() {
        let leaf = Node::leaf(&[2, 6], 0.375);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.n_samples(), 8);
        let Node::Leaf { proba, .. } = leaf else {
            unreachable!()
        };
        assert_eq!(proba, vec![0.25, 0.75]);
    }

    #[test]
    fn branch_accessors() {
        let branch = Node::Branch {
            feature: 14,
            threshold: -2.75,
            left: 1,
            right: 2,
            n_samples: 40,
            impurity: 0.18,
            gain: 5.2,
        };
        assert!(!branch.is_leaf());
        assert_eq!(branch.n_samples(), 40);
        assert!((branch.impurity() - 0.18).abs() < f64::EPSILON);
    }
}
