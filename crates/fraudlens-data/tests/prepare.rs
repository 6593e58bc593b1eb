//! End-to-end data preparation: load, subsample, persist, reload, split, label.

use std::io::Write;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::NamedTempFile;

use fraudlens_data::{
    BinaryLabel, LabelNormalizer, SubsetWriter, Transaction, TransactionReader, sample, split,
};

/// Build a CSV of `n` transactions where every 25th row is fraud ("1").
fn write_fixture(n: usize, seed: u64) -> NamedTempFile {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = String::new();
    out.push_str(&Transaction::FEATURE_NAMES.join(","));
    out.push_str(",Class\n");
    for i in 0..n {
        let class = if i % 25 == 0 { "1" } else { "0" };
        out.push_str(&format!("{}", i as f64 * 1.5));
        for _ in 0..28 {
            out.push_str(&format!(",{}", rng.gen_range(-3.0..3.0)));
        }
        out.push_str(&format!(",{:.2},\"{class}\"\n", rng.gen_range(0.0..500.0)));
    }

    let mut f = NamedTempFile::new().unwrap();
    f.write_all(out.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn sample_persist_and_reload() {
    let fixture = write_fixture(500, 1);
    let full = TransactionReader::new(fixture.path()).read().unwrap();
    assert_eq!(full.len(), 500);

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let subset = sample(full.clone(), 120, &mut rng).unwrap();
    assert_eq!(subset.len(), 120);
    for record in subset.records() {
        assert_eq!(&full.records()[record.row()], record, "sampled record was modified");
    }

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("subset.csv");
    SubsetWriter::new(&out).write(&subset).unwrap();

    let reloaded = TransactionReader::new(&out).read().unwrap();
    assert_eq!(reloaded.len(), 120);
    for (a, b) in reloaded.records().iter().zip(subset.records()) {
        assert_eq!(a.feature_vector(), b.feature_vector());
        assert_eq!(a.class(), b.class());
    }
}

#[test]
fn split_twice_then_label() {
    let fixture = write_fixture(400, 2);
    let data = TransactionReader::new(fixture.path()).read().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let outer = split(data, 0.8, &mut rng).unwrap();
    assert_eq!(outer.selected.len(), 320);
    assert_eq!(outer.rest.len(), 80);

    let inner = split(outer.selected.clone(), 0.8, &mut rng).unwrap();
    assert_eq!(inner.selected.len(), 256);
    assert_eq!(inner.rest.len(), 64);

    let normalizer = LabelNormalizer::default();
    let test = normalizer.label(outer.rest).unwrap();
    let estimation = normalizer.label(inner.selected).unwrap();

    // Held-out rows never appear in the training side.
    let train_rows: std::collections::HashSet<usize> =
        outer.selected.records().iter().map(Transaction::row).collect();
    assert!(test.records().iter().all(|r| !train_rows.contains(&r.row())));

    for (record, label) in estimation.records().iter().zip(estimation.labels()) {
        let expected = if record.class() == "1" {
            BinaryLabel::Fraud
        } else {
            BinaryLabel::Genuine
        };
        assert_eq!(*label, expected);
    }
    assert_eq!(estimation.features()[0].len(), Transaction::FEATURE_NAMES.len());
}
