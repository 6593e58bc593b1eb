//! CSV transaction reader with full input validation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::DataError;
use crate::record::{Dataset, N_ANONYMIZED, Transaction};

/// Name of the categorical label column.
pub const CLASS_COLUMN: &str = "Class";

/// Reads labeled card transactions from a CSV file.
///
/// Expected CSV format:
/// - Header row required, columns located by name (order is free, extra
///   columns are ignored)
/// - `Time,V1,...,V28,Amount,Class`
/// - All rows must have the same number of columns as the header
///
/// The `Class` cell is kept verbatim; it is interpreted later by
/// [`LabelNormalizer`](crate::LabelNormalizer).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`DataError::CsvParse`] | Malformed CSV record |
/// | [`DataError::MissingColumn`] | A required column is absent from the header |
/// | [`DataError::EmptyDataset`] | Zero data rows after header |
/// | [`DataError::InconsistentRowLength`] | Row has different column count than header |
/// | [`DataError::InvalidNumber`] | Numeric cell is NaN, Inf, empty, or unparseable |
pub struct TransactionReader {
    path: PathBuf,
}

/// Header positions of the columns the reader consumes.
struct ColumnMap {
    time: usize,
    v: [usize; N_ANONYMIZED],
    amount: usize,
    class: usize,
}

impl TransactionReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`Dataset`] in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, DataError> {
        let file = std::fs::File::open(&self.path).map_err(|e| DataError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so ragged rows reach the InconsistentRowLength check
        // instead of surfacing as a bare CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?.clone();
        let expected_cols = header.len();
        let columns = self.locate_columns(&header)?;
        debug!(expected_cols, "read CSV header");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;

            if record.len() != expected_cols {
                return Err(DataError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let time = self.parse_cell(&record, &header, columns.time, row_index)?;
            let mut v = [0.0; N_ANONYMIZED];
            for (slot, &col) in v.iter_mut().zip(&columns.v) {
                *slot = self.parse_cell(&record, &header, col, row_index)?;
            }
            let amount = self.parse_cell(&record, &header, columns.amount, row_index)?;
            let class = record.get(columns.class).unwrap_or("");

            records.push(Transaction::new(row_index, time, v, amount, class));
        }

        if records.is_empty() {
            return Err(DataError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let dataset = Dataset::from_records(records);
        for (class, count) in dataset.class_counts() {
            info!(class, count, "class count");
        }
        info!(n_records = dataset.len(), "dataset loaded");

        Ok(dataset)
    }

    fn parse_error(&self, e: csv::Error) -> DataError {
        DataError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }

    fn locate_columns(&self, header: &csv::StringRecord) -> Result<ColumnMap, DataError> {
        let positions: HashMap<&str, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name, i))
            .collect();
        let find = |name: &str| {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| DataError::MissingColumn {
                    path: self.path.clone(),
                    column: name.to_string(),
                })
        };

        let time = find("Time")?;
        let mut v = [0usize; N_ANONYMIZED];
        for (k, slot) in v.iter_mut().enumerate() {
            *slot = find(&format!("V{}", k + 1))?;
        }
        let amount = find("Amount")?;
        let class = find(CLASS_COLUMN)?;

        Ok(ColumnMap {
            time,
            v,
            amount,
            class,
        })
    }

    fn parse_cell(
        &self,
        record: &csv::StringRecord,
        header: &csv::StringRecord,
        col: usize,
        row_index: usize,
    ) -> Result<f64, DataError> {
        let raw = record.get(col).unwrap_or("");
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(DataError::InvalidNumber {
                path: self.path.clone(),
                row_index,
                column: header.get(col).unwrap_or("").to_string(),
                raw: raw.to_string(),
            }),
        }
    }
}
