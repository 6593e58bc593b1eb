//! Transaction record and dataset types.

use std::collections::BTreeMap;

/// Number of anonymized PCA features (`V1`..`V28`).
pub const N_ANONYMIZED: usize = 28;

/// Number of numeric model inputs: `Time`, `V1`..`V28`, `Amount`.
pub const N_FEATURES: usize = N_ANONYMIZED + 2;

/// One labeled card transaction.
///
/// `class` keeps the raw categorical value as read; it becomes a binary
/// label only when a split passes through
/// [`LabelNormalizer`](crate::LabelNormalizer).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    row: usize,
    time: f64,
    v: [f64; N_ANONYMIZED],
    amount: f64,
    class: String,
}

impl Transaction {
    /// Model input column names, in [`Transaction::feature_vector`] order.
    pub const FEATURE_NAMES: [&'static str; N_FEATURES] = [
        "Time", "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V11", "V12",
        "V13", "V14", "V15", "V16", "V17", "V18", "V19", "V20", "V21", "V22", "V23", "V24",
        "V25", "V26", "V27", "V28", "Amount",
    ];

    /// Create a transaction.
    ///
    /// `row` is the zero-based data-row position in the source file.
    pub fn new(
        row: usize,
        time: f64,
        v: [f64; N_ANONYMIZED],
        amount: f64,
        class: impl Into<String>,
    ) -> Self {
        Self {
            row,
            time,
            v,
            amount,
            class: class.into(),
        }
    }

    /// Zero-based data-row position in the source file.
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Seconds elapsed since the first transaction in the source file.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Anonymized features `V1`..`V28`.
    #[must_use]
    pub fn anonymized(&self) -> &[f64; N_ANONYMIZED] {
        &self.v
    }

    /// Transaction amount.
    #[must_use]
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Raw class value as read from the source.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Model input vector: `[time, v1..v28, amount]`.
    #[must_use]
    pub fn feature_vector(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(N_FEATURES);
        out.push(self.time);
        out.extend_from_slice(&self.v);
        out.push(self.amount);
        out
    }

    /// Model input column names as owned strings.
    #[must_use]
    pub fn feature_names() -> Vec<String> {
        Self::FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
    }
}

/// An ordered collection of transactions sharing one schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<Transaction>,
}

impl Dataset {
    /// Wrap an ordered list of transactions.
    #[must_use]
    pub fn from_records(records: Vec<Transaction>) -> Self {
        Self { records }
    }

    /// Return the transactions in order.
    #[must_use]
    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    /// Consume the dataset and return its transactions.
    #[must_use]
    pub fn into_records(self) -> Vec<Transaction> {
        self.records
    }

    /// Number of transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` if the dataset holds no transactions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count transactions per raw class value.
    #[must_use]
    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.class()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(row: usize, class: &str) -> Transaction {
        let mut v = [0.0; N_ANONYMIZED];
        v[0] = -1.36;
        v[27] = 0.02;
        Transaction::new(row, 406.0, v, 149.62, class)
    }

    #[test]
    fn feature_vector_order_matches_names() {
        let t = txn(0, "0");
        let fv = t.feature_vector();
        assert_eq!(fv.len(), N_FEATURES);
        assert_eq!(Transaction::FEATURE_NAMES[0], "Time");
        assert!((fv[0] - 406.0).abs() < f64::EPSILON);
        assert_eq!(Transaction::FEATURE_NAMES[1], "V1");
        assert!((fv[1] + 1.36).abs() < f64::EPSILON);
        assert_eq!(Transaction::FEATURE_NAMES[28], "V28");
        assert!((fv[28] - 0.02).abs() < f64::EPSILON);
        assert_eq!(Transaction::FEATURE_NAMES[29], "Amount");
        assert!((fv[29] - 149.62).abs() < f64::EPSILON);
    }

    #[test]
    fn class_counts_by_raw_value() {
        let ds = Dataset::from_records(vec![txn(0, "0"), txn(1, "1"), txn(2, "0")]);
        let counts = ds.class_counts();
        assert_eq!(counts.get("0"), Some(&2));
        assert_eq!(counts.get("1"), Some(&1));
        assert_eq!(ds.len(), 3);
    }
}
