use std::path::PathBuf;

/// Failures while reading, subsetting, labeling, or writing transactions.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The transaction file could not be opened.
    #[error("cannot open {path}")]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The csv reader rejected the file's structure.
    #[error("malformed CSV in {path} near byte {offset}")]
    CsvParse {
        path: PathBuf,
        /// Byte position reported by the reader, 0 if unknown.
        offset: u64,
        source: csv::Error,
    },

    /// The header lacks `Time`, `V1`..`V28`, `Amount`, or the class column.
    #[error("{path} has no \"{column}\" column")]
    MissingColumn { path: PathBuf, column: String },

    /// Only a header, no transactions.
    #[error("{path} contains no transactions")]
    EmptyDataset { path: PathBuf },

    /// A row is wider or narrower than the header.
    #[error("{path}: row {row_index} has {got} fields but the header has {expected}")]
    InconsistentRowLength {
        path: PathBuf,
        /// Data row position, header excluded.
        row_index: usize,
        expected: usize,
        got: usize,
    },

    /// A feature cell is blank, not a number, NaN, or infinite.
    #[error("{path}: row {row_index}, column {column}: \"{raw}\" is not a finite number")]
    InvalidNumber {
        path: PathBuf,
        /// Data row position, header excluded.
        row_index: usize,
        column: String,
        raw: String,
    },

    /// A sample asked for more transactions than exist.
    #[error("sample of {requested} requested but only {available} transactions are loaded")]
    SampleTooLarge { requested: usize, available: usize },

    /// A split fraction of 0, 1, or outside that range.
    #[error("split fraction {fraction} is not strictly between 0 and 1")]
    InvalidFraction { fraction: f64 },

    /// A class cell matches neither configured value.
    #[error(
        "row {row}: class \"{value}\" is neither the fraud value \"{fraud}\" nor the genuine value \"{genuine}\""
    )]
    UnknownLabel {
        value: String,
        /// Source row of the transaction.
        row: usize,
        fraud: String,
        genuine: String,
    },

    /// The two class values are blank or equal.
    #[error("fraud value \"{fraud}\" and genuine value \"{genuine}\" must be distinct and non-empty")]
    InvalidLabelVocabulary { fraud: String, genuine: String },

    /// The subset file could not be created or a row could not be written.
    #[error("failed writing CSV {path}")]
    WriteCsv { path: PathBuf, source: csv::Error },

    /// Flushing the subset file failed.
    #[error("failed flushing {path}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
