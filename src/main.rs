use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn};

use fraudlens_data::{
    Dataset, LabelNormalizer, LabeledSplit, Partition, SubsetWriter, Transaction, TransactionReader,
    sample, split,
};
use fraudlens_eval::{
    Evaluation, ExperimentName, ExperimentReport, ReportWriter, SplitSizes, score,
};
use fraudlens_rf::{
    Classifier, DecisionTreeConfig, OobMode, RandomForestConfig, Trainer, TreeParams,
    rank_features,
};

/// Features listed per evaluation.
const TOP_FEATURES: usize = 5;

#[derive(Parser)]
#[command(name = "fraudlens")]
#[command(about = "Decision tree and random forest evaluation for card fraud detection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for sampling, splitting, and model training
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Draw a random subset of a transaction file and write it as CSV
    Sample {
        /// Path to the full transaction CSV
        #[arg(long)]
        data: PathBuf,

        /// Number of records to keep
        #[arg(long)]
        size: usize,

        /// Path of the subset CSV to write
        #[arg(long)]
        output: PathBuf,
    },

    /// Train a decision tree and a random forest and evaluate both
    Evaluate {
        /// Path to the transaction CSV
        #[arg(long)]
        data: PathBuf,

        /// Subsample this many records before splitting (all records if not set)
        #[arg(long)]
        sample_size: Option<usize>,

        /// Fraction of records in the training partition
        #[arg(long, default_value_t = 0.8)]
        train_fraction: f64,

        /// Fraction of the training partition held out for validation
        #[arg(long, default_value_t = 0.2)]
        validation_fraction: f64,

        /// Number of trees in the random forest
        #[arg(long, default_value_t = 100)]
        n_trees: usize,

        /// Maximum tree depth (unlimited if not set)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Raw class value marking fraud
        #[arg(long, default_value = "1")]
        fraud_label: String,

        /// Raw class value marking a genuine transaction
        #[arg(long, default_value = "0")]
        genuine_label: String,

        /// Record positions whose probabilities are reported
        #[arg(long, num_args = 1..)]
        lookup: Vec<usize>,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct SampleOutput {
    output: PathBuf,
    n_loaded: usize,
    n_written: usize,
    class_counts: BTreeMap<String, usize>,
}

#[derive(Serialize)]
struct EvaluateOutput {
    experiment: String,
    seed: u64,
    sizes: SplitSizes,
    report: PathBuf,
    results: Vec<EvaluationOutput>,
}

#[derive(Serialize)]
struct EvaluationOutput {
    model: String,
    partition: String,
    auc: f64,
    accuracy: f64,
    recall: f64,
    precision: f64,
}

/// Pipeline-wide settings shared by every model evaluation.
struct EvalContext<'a> {
    lookups: &'a [usize],
    feature_names: Vec<String>,
    writer: &'a ReportWriter,
}

/// Fit `trainer` on `fit_on`, score `eval_on`, print the section, and write its ROC curve.
fn evaluate_model<T: Trainer>(
    trainer: &T,
    partition: &str,
    fit_on: &LabeledSplit,
    eval_on: &LabeledSplit,
    ctx: &EvalContext<'_>,
) -> Result<Evaluation> {
    let model = trainer
        .train(&fit_on.features(), &fit_on.label_indices())
        .with_context(|| format!("failed to train {}", trainer.name()))?;
    info!(model = trainer.name(), n_train = fit_on.len(), "model trained");

    let scored = score(&model, eval_on)
        .with_context(|| format!("failed to score {partition} with {}", trainer.name()))?;
    let ranked = rank_features(&model.feature_importances(), &ctx.feature_names);

    let (evaluation, roc) = Evaluation::from_scored(trainer.name(), partition, &scored, ctx.lookups)
        .with_context(|| format!("failed to evaluate {} on {partition}", trainer.name()))?;
    let evaluation = evaluation
        .with_oob_accuracy(model.oob_accuracy())
        .with_top_features(&ranked, TOP_FEATURES);

    ctx.writer.write_roc(trainer.name(), partition, &roc)?;
    println!("{evaluation}");
    Ok(evaluation)
}

fn label_partition(
    normalizer: &LabelNormalizer,
    name: &str,
    dataset: Dataset,
) -> Result<LabeledSplit> {
    let labeled = normalizer
        .label(dataset)
        .with_context(|| format!("failed to label {name} partition"))?;
    if labeled.n_fraud() == 0 {
        warn!(partition = name, len = labeled.len(), "partition contains no fraud records");
    }
    Ok(labeled)
}

fn run_sample(data: &Path, size: usize, output: PathBuf, seed: u64) -> Result<()> {
    let dataset = TransactionReader::new(data)
        .read()
        .context("failed to read input CSV")?;
    let n_loaded = dataset.len();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let subset = sample(dataset, size, &mut rng).context("sampling failed")?;
    SubsetWriter::new(&output)
        .write(&subset)
        .context("failed to write subset CSV")?;

    let class_counts = subset
        .class_counts()
        .into_iter()
        .map(|(class, n)| (class.to_string(), n))
        .collect();
    let out = SampleOutput {
        output,
        n_loaded,
        n_written: subset.len(),
        class_counts,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Sample { data, size, output } => run_sample(&data, size, output, cli.seed)?,

        Command::Evaluate {
            data,
            sample_size,
            train_fraction,
            validation_fraction,
            n_trees,
            max_depth,
            fraud_label,
            genuine_label,
            lookup,
            experiment,
            output_dir,
        } => {
            let experiment_name = ExperimentName::new(experiment.clone())?;
            let normalizer = LabelNormalizer::new(&fraud_label, &genuine_label)?;
            let params = TreeParams::new().with_max_depth(max_depth);
            let tree_config = DecisionTreeConfig::new()
                .with_params(params)
                .with_seed(cli.seed);
            let forest_config = RandomForestConfig::new(n_trees)?
                .with_params(params)
                .with_oob_mode(OobMode::Enabled)
                .with_seed(cli.seed);

            // 1. Load and optionally subsample
            let dataset = TransactionReader::new(&data)
                .read()
                .context("failed to read input CSV")?;
            let loaded = dataset.len();

            let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
            let sampled = match sample_size {
                Some(k) => sample(dataset, k, &mut rng).context("sampling failed")?,
                None => dataset,
            };
            let n_sampled = sampled.len();

            // 2. Split train/test, then estimation/validation from train
            let Partition {
                selected: train,
                rest: test,
            } = split(sampled, train_fraction, &mut rng).context("train/test split failed")?;
            let Partition {
                selected: estimation,
                rest: validation,
            } = split(train.clone(), 1.0 - validation_fraction, &mut rng)
                .context("estimation/validation split failed")?;

            // 3. Normalize labels once per split
            let train = label_partition(&normalizer, "train", train)?;
            let test = label_partition(&normalizer, "test", test)?;
            let estimation = label_partition(&normalizer, "estimation", estimation)?;
            let validation = label_partition(&normalizer, "validation", validation)?;

            let sizes = SplitSizes {
                loaded,
                sampled: n_sampled,
                train: train.len(),
                test: test.len(),
                estimation: estimation.len(),
                validation: validation.len(),
            };
            println!("== data ==");
            println!("loaded {loaded} records, kept {n_sampled}");
            for (name, part) in [
                ("train", &train),
                ("test", &test),
                ("estimation", &estimation),
                ("validation", &validation),
            ] {
                println!("{name}: {} records ({} fraud)", part.len(), part.n_fraud());
            }
            println!();

            // 4. Fit on estimation -> validate; refit on train -> test
            let writer = ReportWriter::new(&output_dir, experiment_name)?;
            let ctx = EvalContext {
                lookups: &lookup,
                feature_names: Transaction::feature_names(),
                writer: &writer,
            };
            let mut evaluations = Vec::with_capacity(4);
            for (partition, fit_on, eval_on) in [
                ("validation", &estimation, &validation),
                ("test", &train, &test),
            ] {
                evaluations.push(evaluate_model(&tree_config, partition, fit_on, eval_on, &ctx)?);
                evaluations.push(evaluate_model(&forest_config, partition, fit_on, eval_on, &ctx)?);
            }

            // 5. Write report and print summary
            let report = ExperimentReport {
                experiment: experiment.clone(),
                seed: cli.seed,
                sizes,
                evaluations,
            };
            let report_path = writer.write_report(&report)?;

            let output = EvaluateOutput {
                experiment,
                seed: cli.seed,
                sizes,
                report: report_path,
                results: report
                    .evaluations
                    .iter()
                    .map(|e| EvaluationOutput {
                        model: e.model.clone(),
                        partition: e.partition.clone(),
                        auc: e.auc,
                        accuracy: e.metrics.accuracy,
                        recall: e.metrics.recall,
                        precision: e.metrics.precision,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
