//! Load → split → label → train → score → evaluate, end to end.

use std::io::Write;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::NamedTempFile;

use fraudlens_data::{
    BinaryLabel, Dataset, LabelNormalizer, LabeledSplit, N_ANONYMIZED, Transaction,
    TransactionReader, sample, split,
};
use fraudlens_eval::{
    EvalError, Evaluation, ExperimentName, ExperimentReport, ReportWriter, ScoredSplit,
    SplitSizes, score,
};
use fraudlens_rf::{DecisionTreeConfig, RandomForestConfig, RfError, Trainer, TreeParams};

/// A transaction whose anonymized features sit around `center`; amount is constant.
fn txn(row: usize, rng: &mut ChaCha8Rng, center: f64, class: &str) -> Transaction {
    let mut v = [0.0; N_ANONYMIZED];
    for x in &mut v {
        *x = center + rng.gen_range(-0.5..0.5);
    }
    Transaction::new(row, row as f64, v, 100.0, class)
}

/// `n` transactions, one fraud per `fraud_every`, fraud shifted far from genuine.
fn make_dataset(n: usize, fraud_every: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Dataset::from_records(
        (0..n)
            .map(|i| {
                if i % fraud_every == 0 {
                    txn(i, &mut rng, -5.0, "1")
                } else {
                    txn(i, &mut rng, 0.0, "0")
                }
            })
            .collect(),
    )
}

fn write_csv(ds: &Dataset) -> NamedTempFile {
    let mut out = Transaction::FEATURE_NAMES.join(",");
    out.push_str(",Class\n");
    for r in ds.records() {
        let cells: Vec<String> = r.feature_vector().iter().map(ToString::to_string).collect();
        out.push_str(&format!("{},{}\n", cells.join(","), r.class()));
    }
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(out.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

fn labeled(records: Vec<Transaction>) -> LabeledSplit {
    LabelNormalizer::default()
        .label(Dataset::from_records(records))
        .unwrap()
}

fn train_score<T: Trainer>(trainer: &T, train: &LabeledSplit, eval: &LabeledSplit) -> ScoredSplit {
    let model = trainer
        .train(&train.features(), &train.label_indices())
        .unwrap();
    score(&model, eval).unwrap()
}

#[test]
fn full_pipeline_from_csv() {
    let fixture = write_csv(&make_dataset(1200, 20, 7));
    let full = TransactionReader::new(fixture.path()).read().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let sampled = sample(full, 1000, &mut rng).unwrap();
    let outer = split(sampled, 0.8, &mut rng).unwrap();
    let inner = split(outer.selected.clone(), 0.8, &mut rng).unwrap();
    assert_eq!(outer.selected.len() + outer.rest.len(), 1000);
    assert_eq!(inner.selected.len() + inner.rest.len(), outer.selected.len());

    let normalizer = LabelNormalizer::default();
    let estimation = normalizer.label(inner.selected).unwrap();
    let validation = normalizer.label(inner.rest).unwrap();
    let train = normalizer.label(outer.selected).unwrap();
    let test = normalizer.label(outer.rest).unwrap();

    let tree = DecisionTreeConfig::new();
    let forest = RandomForestConfig::new(30).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let writer = ReportWriter::new(dir.path(), ExperimentName::new("pipeline").unwrap()).unwrap();
    let mut evaluations = Vec::new();

    for (partition, fit_on, eval_on) in [
        ("validation", &estimation, &validation),
        ("test", &train, &test),
    ] {
        for (model, scored) in [
            ("decision_tree", train_score(&tree, fit_on, eval_on)),
            ("random_forest", train_score(&forest, fit_on, eval_on)),
        ] {
            for s in scored.scores() {
                assert!((0.0..=1.0).contains(&s.p_fraud));
                assert!((s.p_fraud + s.p_genuine - 1.0).abs() < 1e-9);
            }
            let (evaluation, roc) = Evaluation::from_scored(model, partition, &scored, &[0]).unwrap();
            assert_eq!(evaluation.confusion.total(), eval_on.len());
            assert!(evaluation.auc > 0.95, "{model} on {partition}: AUC {}", evaluation.auc);
            writer.write_roc(model, partition, &roc).unwrap();
            evaluations.push(evaluation);
        }
    }

    let report = ExperimentReport {
        experiment: "pipeline".to_string(),
        seed: 42,
        sizes: SplitSizes {
            loaded: 1200,
            sampled: 1000,
            train: train.len(),
            test: test.len(),
            estimation: estimation.len(),
            validation: validation.len(),
        },
        evaluations,
    };
    writer.write_report(&report).unwrap();
    assert!(dir.path().join("pipeline_report.json").exists());
    assert!(dir.path().join("pipeline_random_forest_test_roc.csv").exists());
}

#[test]
fn ten_record_scenario() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let genuine: Vec<Transaction> = (0..8).map(|i| txn(i, &mut rng, 0.0, "0")).collect();
    let fraud: Vec<Transaction> = (8..10).map(|i| txn(i, &mut rng, -5.0, "1")).collect();

    // Eight genuine records alone cannot train a fraud model.
    let genuine_only = labeled(genuine.clone());
    let err = DecisionTreeConfig::new()
        .train(&genuine_only.features(), &genuine_only.label_indices())
        .unwrap_err();
    assert!(matches!(err, RfError::DegenerateLabels { observed: 1 }));

    // Train on six genuine plus both fraud records; hold out fresh fraud cases.
    let mut train_records = genuine[..6].to_vec();
    train_records.extend(fraud);
    let train = labeled(train_records);
    assert_eq!(train.len(), 8);
    let held_out = labeled(vec![txn(10, &mut rng, -5.0, "1"), txn(11, &mut rng, -5.0, "1")]);

    let scored = train_score(&DecisionTreeConfig::new(), &train, &held_out);
    assert_eq!(scored.predicted(), vec![BinaryLabel::Fraud, BinaryLabel::Fraud]);
}

#[test]
fn lookup_beyond_test_set_fails() {
    let train = LabelNormalizer::default()
        .label(make_dataset(200, 10, 1))
        .unwrap();
    let test = LabelNormalizer::default()
        .label(make_dataset(1998, 10, 2))
        .unwrap();

    let shallow = DecisionTreeConfig::new().with_params(TreeParams::new().with_max_depth(Some(4)));
    let scored = train_score(&shallow, &train, &test);
    assert_eq!(scored.len(), 1998);
    assert!(scored.lookup(1997).is_ok());

    let err = scored.lookup(5000).unwrap_err();
    assert!(matches!(
        err,
        EvalError::IndexOutOfBounds {
            index: 5000,
            len: 1998
        }
    ));
    assert!(matches!(
        Evaluation::from_scored("decision_tree", "test", &scored, &[5000]),
        Err(EvalError::IndexOutOfBounds { .. })
    ));
}

#[test]
fn random_scores_give_chance_auc() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let truth: Vec<BinaryLabel> = (0..20_000)
        .map(|i| {
            if i % 2 == 0 {
                BinaryLabel::Fraud
            } else {
                BinaryLabel::Genuine
            }
        })
        .collect();
    let p: Vec<f64> = truth.iter().map(|_| rng.r#gen::<f64>()).collect();

    let auc = ScoredSplit::from_probabilities(&truth, &p)
        .unwrap()
        .roc()
        .unwrap()
        .auc();
    assert!((auc - 0.5).abs() < 0.02, "random AUC {auc}");
}

#[test]
fn single_class_evaluation_set_is_rejected() {
    let train = LabelNormalizer::default()
        .label(make_dataset(100, 5, 4))
        .unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let genuine_only = labeled((0..20).map(|i| txn(i, &mut rng, 0.0, "0")).collect());

    let model = RandomForestConfig::new(10)
        .unwrap()
        .fit(&train.features(), &train.label_indices())
        .unwrap();
    let scored = score(&model, &genuine_only).unwrap();
    assert!(matches!(
        scored.roc(),
        Err(EvalError::SingleClass {
            class: BinaryLabel::Genuine,
            n_samples: 20
        })
    ));
}
