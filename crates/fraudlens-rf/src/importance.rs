//! Mean-decrease-in-impurity importance and feature ranking.

/// A feature's normalized importance and its 1-based position in the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    pub name: String,
    pub importance: f64,
    pub rank: usize,
}

/// Scale `totals` to sum to 1.0. All-zero input (a model that never split)
/// is returned unchanged.
pub(crate) fn normalize(mut totals: Vec<f64>) -> Vec<f64> {
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        for v in &mut totals {
            *v /= sum;
        }
    }
    totals
}

/// Sort features by importance, highest first. Ties keep column order.
///
/// `importances` and `names` are zipped; surplus entries in either are dropped.
#[must_use]
pub fn rank_features(importances: &[f64], names: &[String]) -> Vec<RankedFeature> {
    let mut order: Vec<usize> = (0..importances.len().min(names.len())).collect();
    order.sort_by(|&a, &b| importances[b].total_cmp(&importances[a]));
    order
        .into_iter()
        .enumerate()
        .map(|(pos, col)| RankedFeature {
            name: names[col].clone(),
            importance: importances[col],
            rank: pos + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn normalize_sums_to_one() {
        let v = normalize(vec![3.0, 1.0, 0.0]);
        assert_eq!(v, vec![0.75, 0.25, 0.0]);
        assert_eq!(normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn ranking_orders_by_importance() {
        let ranked = rank_features(&[0.1, 0.7, 0.2], &names(&["Time", "V14", "Amount"]));
        let order: Vec<(&str, usize)> = ranked.iter().map(|f| (f.name.as_str(), f.rank)).collect();
        assert_eq!(order, vec![("V14", 1), ("Amount", 2), ("Time", 3)]);
    }

    #[test]
    fn ties_keep_column_order_and_lengths_are_clipped() {
        let ranked = rank_features(&[0.5, 0.5, 0.0], &names(&["V1", "V2"]));
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "V1");
        assert_eq!(ranked[1].name, "V2");
    }
}
