//! CSV writer for transaction subsets.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::DataError;
use crate::reader::CLASS_COLUMN;
use crate::record::{Dataset, Transaction};

/// Writes a [`Dataset`] back out in the loader's column layout.
///
/// The header is `Time,V1,...,V28,Amount,Class`, so the output can be read
/// again with [`TransactionReader`](crate::TransactionReader). Floats use
/// the shortest representation that parses back to the same value.
pub struct SubsetWriter {
    path: PathBuf,
}

impl SubsetWriter {
    /// Create a writer targeting `path`. The file is created on [`SubsetWriter::write`].
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write every record of `dataset`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::WriteCsv`] if the file cannot be created or a
    /// record cannot be written, or [`DataError::WriteFile`] if the final
    /// flush fails.
    #[instrument(skip_all, fields(path = %self.path.display(), n = dataset.len()))]
    pub fn write(&self, dataset: &Dataset) -> Result<(), DataError> {
        let csv_err = |e| DataError::WriteCsv {
            path: self.path.clone(),
            source: e,
        };
        let mut wtr = csv::Writer::from_path(&self.path).map_err(csv_err)?;

        let mut header: Vec<&str> = Transaction::FEATURE_NAMES.to_vec();
        header.push(CLASS_COLUMN);
        wtr.write_record(&header).map_err(csv_err)?;

        for record in dataset.records() {
            let mut fields: Vec<String> = record
                .feature_vector()
                .iter()
                .map(ToString::to_string)
                .collect();
            fields.push(record.class().to_string());
            wtr.write_record(&fields).map_err(csv_err)?;
        }

        wtr.flush().map_err(|e| DataError::WriteFile {
            path: self.path.clone(),
            source: e,
        })?;

        info!(n_records = dataset.len(), "subset written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransactionReader;
    use crate::record::N_ANONYMIZED;

    #[test]
    fn write_then_read_preserves_records() {
        let mut v = [0.0; N_ANONYMIZED];
        v[3] = 0.1 + 0.2;
        v[20] = -1.234_567_890_123;
        let ds = Dataset::from_records(vec![
            Transaction::new(0, 0.0, v, 149.62, "0"),
            Transaction::new(1, 10.5, [1e-300; N_ANONYMIZED], 0.0, "1"),
        ]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subset.csv");
        SubsetWriter::new(&path).write(&ds).unwrap();

        let back = TransactionReader::new(&path).read().unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn unwritable_path() {
        let ds = Dataset::from_records(vec![Transaction::new(0, 0.0, [0.0; N_ANONYMIZED], 1.0, "0")]);
        let err = SubsetWriter::new(Path::new("/nonexistent/dir/out.csv"))
            .write(&ds)
            .unwrap_err();
        assert!(matches!(err, DataError::WriteCsv { .. }));
    }
}
