//! Criterion benchmarks for fraudlens-eval: ROC sweep and confusion tally.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fraudlens_data::BinaryLabel;
use fraudlens_eval::{BinaryConfusion, RocCurve};

/// Scores for `n` records with 2% fraud, fraud scoring higher on average.
fn make_scores(n: usize, seed: u64) -> (Vec<BinaryLabel>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let truth: Vec<BinaryLabel> = (0..n)
        .map(|i| {
            if i % 50 == 0 {
                BinaryLabel::Fraud
            } else {
                BinaryLabel::Genuine
            }
        })
        .collect();
    let scores = truth
        .iter()
        .map(|l| {
            let base: f64 = rng.r#gen();
            if l.is_fraud() { (base + 0.5).min(1.0) } else { base * 0.8 }
        })
        .collect();
    (truth, scores)
}

fn bench_roc(c: &mut Criterion) {
    let (truth, scores) = make_scores(57_000, 42);

    c.bench_function("roc_curve_57000", |b| {
        b.iter(|| RocCurve::from_scores(&truth, &scores).unwrap().auc());
    });
}

fn bench_confusion(c: &mut Criterion) {
    let (truth, scores) = make_scores(57_000, 42);
    let predicted: Vec<BinaryLabel> = scores
        .iter()
        .map(|&p| if p >= 0.5 { BinaryLabel::Fraud } else { BinaryLabel::Genuine })
        .collect();

    c.bench_function("binary_confusion_57000", |b| {
        b.iter(|| BinaryConfusion::from_labels(&truth, &predicted).unwrap());
    });
}

criterion_group!(benches, bench_roc, bench_confusion);
criterion_main!(benches);
