/// Failures raised while fitting or querying a tree model.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// A hyperparameter is outside its allowed range.
    #[error("invalid {name} = {value}: expected {expected}")]
    InvalidHyperparameter {
        /// Parameter name as it appears on the config builder.
        name: &'static str,
        /// The rejected value, formatted.
        value: String,
        /// Human-readable allowed range.
        expected: &'static str,
    },

    /// The feature matrix has no rows.
    #[error("cannot train on an empty feature matrix")]
    EmptyTrainingSet,

    /// Rows exist but carry no columns.
    #[error("feature rows have no columns")]
    NoFeatures,

    /// `labels` and `features` disagree on the number of rows.
    #[error("{labels} labels supplied for {rows} feature rows")]
    LabelCountMismatch {
        /// Feature rows.
        rows: usize,
        /// Labels.
        labels: usize,
    },

    /// A row is shorter or longer than the first row.
    #[error("row {row} has {got} columns, the first row has {expected}")]
    RaggedRow {
        /// Zero-based row position.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        got: usize,
    },

    /// A training value is NaN or infinite.
    #[error("value at row {row}, column {column} is not finite")]
    NonFiniteValue {
        /// Zero-based row position.
        row: usize,
        /// Zero-based column position.
        column: usize,
    },

    /// Fewer than two classes appear in the labels.
    #[error("labels contain {observed} distinct class(es); a classifier needs at least 2")]
    DegenerateLabels {
        /// Distinct classes seen.
        observed: usize,
    },

    /// A prediction input has the wrong number of columns.
    #[error("model expects {expected} features, got {got}")]
    InputWidth {
        /// Width the model was trained on.
        expected: usize,
        /// Width supplied.
        got: usize,
    },

    /// Out-of-bag scoring was requested but every row landed in every bag.
    #[error("no training row was left out of any bootstrap draw")]
    NoOutOfBagRows,
}
