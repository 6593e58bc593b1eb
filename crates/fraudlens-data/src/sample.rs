//! Random subsampling and two-way partitioning of a [`Dataset`].
//!
//! Both operations draw from a caller-supplied RNG so a fixed seed gives a
//! reproducible selection, and both preserve source order within each output.

use rand::Rng;
use tracing::{debug, instrument};

use crate::DataError;
use crate::record::{Dataset, Transaction};

/// Two disjoint parts of a dataset whose union is the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// The randomly selected part, sized `round(fraction * n)`.
    pub selected: Dataset,
    /// Every record not selected.
    pub rest: Dataset,
}

/// Draw `size` records uniformly without replacement.
///
/// The result keeps the relative order the records had in `dataset`.
///
/// # Errors
///
/// Returns [`DataError::SampleTooLarge`] if `size > dataset.len()`.
#[instrument(skip(dataset, rng), fields(available = dataset.len()))]
pub fn sample<R: Rng + ?Sized>(
    dataset: Dataset,
    size: usize,
    rng: &mut R,
) -> Result<Dataset, DataError> {
    let available = dataset.len();
    if size > available {
        return Err(DataError::SampleTooLarge {
            requested: size,
            available,
        });
    }

    let (selected, _) = take_random(dataset.into_records(), size, rng);
    debug!(size, "sampled dataset");
    Ok(Dataset::from_records(selected))
}

/// Partition `dataset` at random into `round(fraction * n)` and the remainder.
///
/// Order within each part follows the source order. No stratification is
/// applied, so a small or highly imbalanced input can leave a part without
/// any minority-class record.
///
/// # Errors
///
/// Returns [`DataError::InvalidFraction`] unless `0 < fraction < 1`.
#[instrument(skip(dataset, rng), fields(n = dataset.len()))]
pub fn split<R: Rng + ?Sized>(
    dataset: Dataset,
    fraction: f64,
    rng: &mut R,
) -> Result<Partition, DataError> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(DataError::InvalidFraction { fraction });
    }

    let n = dataset.len();
    let k = ((fraction * n as f64).round() as usize).min(n);
    let (selected, rest) = take_random(dataset.into_records(), k, rng);
    let partition = Partition {
        selected: Dataset::from_records(selected),
        rest: Dataset::from_records(rest),
    };

    debug!(
        selected = partition.selected.len(),
        rest = partition.rest.len(),
        "split dataset"
    );

    Ok(partition)
}

/// Choose `k` positions uniformly and split `records` into chosen and unchosen,
/// both in source order.
fn take_random<R: Rng + ?Sized>(
    records: Vec<Transaction>,
    k: usize,
    rng: &mut R,
) -> (Vec<Transaction>, Vec<Transaction>) {
    let n = records.len();
    let mut chosen = vec![false; n];
    for i in rand::seq::index::sample(rng, n, k) {
        chosen[i] = true;
    }

    let mut selected = Vec::with_capacity(k);
    let mut rest = Vec::with_capacity(n - k);
    for (record, pick) in records.into_iter().zip(chosen) {
        if pick {
            selected.push(record);
        } else {
            rest.push(record);
        }
    }
    (selected, rest)
}
