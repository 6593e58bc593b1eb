//! Impurity measures and the exact threshold search behind every tree node.

use rand::Rng;
use rand::seq::index;

/// Impurity measure a split tries to reduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// `1 - sum(p^2)`.
    Gini,
    /// `-sum(p ln p)` over the classes present.
    Entropy,
}

impl Criterion {
    /// Impurity of a node holding `counts[class]` rows per class.
    ///
    /// An empty node is pure.
    #[must_use]
    pub fn impurity(self, counts: &[usize]) -> f64 {
        let total: usize = counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let total = total as f64;
        let shares = counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / total);
        match self {
            Criterion::Gini => 1.0 - shares.map(|p| p * p).sum::<f64>(),
            Criterion::Entropy => -shares.map(|p| p * p.ln()).sum::<f64>(),
        }
    }
}

/// A chosen `column <= threshold` test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cut {
    pub(crate) feature: usize,
    pub(crate) threshold: f64,
    /// `n * parent - n_left * left - n_right * right`, in row units.
    pub(crate) gain: f64,
}

/// Everything fixed for the lifetime of one tree's growth.
pub(crate) struct SplitSearch<'a> {
    /// Column-major training matrix: `columns[feature][row]`.
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: Criterion,
    pub(crate) n_candidates: usize,
    pub(crate) min_leaf: usize,
}

impl SplitSearch<'_> {
    /// Best cut over `n_candidates` randomly drawn columns (all of them, in
    /// order, when `n_candidates` covers the matrix) for the node
    /// holding `rows` (which may repeat, as in a bootstrap draw).
    ///
    /// `counts` are the node's per-class row counts. Thresholds sit halfway
    /// between adjacent distinct values. `None` when every candidate is
    /// constant on these rows or every boundary violates `min_leaf`.
    pub(crate) fn best_cut<R: Rng + ?Sized>(
        &self,
        rows: &[usize],
        counts: &[usize],
        rng: &mut R,
    ) -> Option<Cut> {
        let n = rows.len();
        if n < 2 * self.min_leaf {
            return None;
        }
        let parent = n as f64 * self.criterion.impurity(counts);

        let mut best: Option<Cut> = None;
        let mut column: Vec<(f64, usize)> = Vec::with_capacity(n);
        let n_features = self.columns.len();
        let candidates = if self.n_candidates >= n_features {
            (0..n_features).collect()
        } else {
            index::sample(rng, n_features, self.n_candidates).into_vec()
        };
        for feature in candidates {
            let values = &self.columns[feature];
            column.clear();
            column.extend(rows.iter().map(|&r| (values[r], self.labels[r])));
            column.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            if let Some(cut) = self.scan(feature, &column, counts, parent)
                && best.is_none_or(|b| cut.gain > b.gain)
            {
                best = Some(cut);
            }
        }
        best
    }

    /// Sweep one sorted `(value, label)` column, moving rows from right to left.
    fn scan(
        &self,
        feature: usize,
        sorted: &[(f64, usize)],
        counts: &[usize],
        parent: f64,
    ) -> Option<Cut> {
        let n = sorted.len();
        let mut left = vec![0usize; self.n_classes];
        let mut right = counts.to_vec();
        let mut best: Option<Cut> = None;

        for (i, pair) in sorted.windows(2).enumerate() {
            let ((lo, label), (hi, _)) = (pair[0], pair[1]);
            left[label] += 1;
            right[label] -= 1;

            let n_left = i + 1;
            if lo == hi || n_left < self.min_leaf || n - n_left < self.min_leaf {
                continue;
            }
            let gain = parent
                - n_left as f64 * self.criterion.impurity(&left)
                - (n - n_left) as f64 * self.criterion.impurity(&right);
            if best.is_none_or(|b| gain > b.gain) {
                // Adjacent floats can round the midpoint up to `hi`.
                let mid = lo + (hi - lo) / 2.0;
                best = Some(Cut {
                    feature,
                    threshold: if mid < hi { mid } else { lo },
                    gain,
                });
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn search<'a>(
        columns: &'a [Vec<f64>],
        labels: &'a [usize],
        n_candidates: usize,
        min_leaf: usize,
    ) -> SplitSearch<'a> {
        SplitSearch {
            columns,
            labels,
            n_classes: 2,
            criterion: Criterion::Gini,
            n_candidates,
            min_leaf,
        }
    }

    fn counts(labels: &[usize]) -> Vec<usize> {
        let fraud = labels.iter().filter(|&&l| l == 0).count();
        vec![fraud, labels.len() - fraud]
    }

    #[test]
    fn gini_values() {
        assert!(Criterion::Gini.impurity(&[0, 12]).abs() < f64::EPSILON);
        assert!((Criterion::Gini.impurity(&[4, 4]) - 0.5).abs() < f64::EPSILON);
        // 1 fraud in 100: 1 - (0.01^2 + 0.99^2)
        assert!((Criterion::Gini.impurity(&[1, 99]) - 0.0198).abs() < 1e-12);
    }

    #[test]
    fn entropy_values() {
        assert!((Criterion::Entropy.impurity(&[3, 3]) - 2.0_f64.ln()).abs() < 1e-10);
        assert!(Criterion::Entropy.impurity(&[0, 0]).abs() < f64::EPSILON);
    }

    #[test]
    fn informative_column_beats_noise() {
        // Column 0 is noise; column 1 puts both fraud rows far below the rest.
        let columns = vec![
            vec![0.3, 0.1, 0.4, 0.2, 0.5, 0.9],
            vec![-8.0, -7.5, 1.0, 1.2, 0.9, 1.1],
        ];
        let labels = vec![0, 0, 1, 1, 1, 1];
        let rows: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let cut = search(&columns, &labels, 2, 1)
            .best_cut(&rows, &counts(&labels), &mut rng)
            .unwrap();
        assert_eq!(cut.feature, 1);
        assert!((cut.threshold - (-7.5 + 0.9) / 2.0).abs() < 1e-12);
        // Parent gini 4/9 over 6 rows, both children pure.
        assert!((cut.gain - 6.0 * 4.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn repeated_rows_count_twice() {
        let columns = vec![vec![-3.0, 0.0, 1.0]];
        let labels = vec![0, 1, 1];
        let rows = vec![0, 0, 1, 2, 2];
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let cut = search(&columns, &labels, 1, 1)
            .best_cut(&rows, &[2, 3], &mut rng)
            .unwrap();
        assert!((cut.threshold + 1.5).abs() < 1e-12);
    }

    #[test]
    fn constant_column_has_no_cut() {
        let columns = vec![vec![2.5; 4]];
        let labels = vec![0, 1, 1, 1];
        let rows: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(search(&columns, &labels, 1, 1).best_cut(&rows, &[1, 3], &mut rng).is_none());
    }

    #[test]
    fn min_leaf_blocks_lopsided_cut() {
        let columns = vec![vec![1.0, 2.0, 3.0]];
        let labels = vec![0, 1, 1];
        let rows: Vec<usize> = (0..3).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(search(&columns, &labels, 1, 2).best_cut(&rows, &[1, 2], &mut rng).is_none());
    }
}
