//! Transaction loading, subsampling, partitioning, and labeling.
//!
//! Reads the card-transaction CSV into an ordered [`Dataset`], draws
//! reproducible random subsets and partitions from it, and maps raw class
//! values onto [`BinaryLabel`] before anything reaches a model.

mod error;
mod label;
mod reader;
mod record;
mod sample;
mod writer;

pub use error::DataError;
pub use label::{BinaryLabel, ClassValue, LabelNormalizer, LabeledSplit};
pub use reader::{CLASS_COLUMN, TransactionReader};
pub use record::{Dataset, N_ANONYMIZED, N_FEATURES, Transaction};
pub use sample::{Partition, sample, split};
pub use writer::SubsetWriter;
