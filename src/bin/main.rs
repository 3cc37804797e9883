//! binsvm Command Line Interface
//!
//! Trains a linear binary SVM on CSV data and reports the fitted model or
//! its evaluation metrics on a held-out file.

use binsvm::api::{EvaluationMetrics, TrainedModel, SVM};
use binsvm::core::{Result, SVMError, TrainerConfig};
use binsvm::{DenseDataset, LinearKernel};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "binsvm")]
#[command(about = "Binary SVM training with Sequential Minimal Optimization")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model and report it together with its training accuracy
    Train(TrainArgs),
    /// Train on one file and evaluate on another
    Evaluate(EvaluateArgs),
}

/// Trainer parameters shared by all subcommands
#[derive(Args)]
struct TrainerArgs {
    /// JSON file with trainer parameters; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Regularization parameter C
    #[arg(short = 'C', long)]
    c: Option<f64>,

    /// KKT tolerance
    #[arg(long)]
    tolerance: Option<f64>,

    /// Maximum number of outer sweeps
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Seed for reproducible training
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (CSV, label in the last column)
    #[arg(long)]
    data: PathBuf,

    #[command(flatten)]
    trainer: TrainerArgs,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Training data file
    #[arg(long)]
    train: PathBuf,

    /// Test data file
    #[arg(long)]
    test: PathBuf,

    #[command(flatten)]
    trainer: TrainerArgs,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_config(args: &TrainerArgs) -> Result<TrainerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading trainer configuration from: {path:?}");
            TrainerConfig::from_json(&fs::read_to_string(path)?)?
        }
        None => TrainerConfig::default(),
    };

    if let Some(c) = args.c {
        config.c = c;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.validate()?;
    Ok(config)
}

fn load_dataset(path: &Path) -> Result<DenseDataset> {
    info!("Loading dataset from: {path:?}");
    let dataset = DenseDataset::from_csv_file(path)?;
    info!(
        "Loaded {} samples with {} features",
        dataset.len(),
        dataset.features().ncols()
    );

    if dataset.len() < 2 {
        return Err(SVMError::InvalidDataset(
            "Dataset must contain at least 2 samples".to_string(),
        ));
    }
    Ok(dataset)
}

fn train_model(config: TrainerConfig, dataset: &DenseDataset) -> Result<TrainedModel<LinearKernel>> {
    info!(
        "Parameters: C={}, tolerance={}, max_iterations={}",
        config.c, config.tolerance, config.max_iterations
    );
    SVM::new().with_config(config).train(dataset)
}

fn train_command(args: TrainArgs) -> Result<()> {
    let config = load_config(&args.trainer)?;
    let dataset = load_dataset(&args.data)?;
    let model = train_model(config, &dataset)?;

    let info = model.info();
    println!("=== Trained Model ===");
    println!("Support vectors: {}", info.n_support_vectors);
    println!("Bias: {:.6}", info.bias);
    println!(
        "Weights: [{}]",
        info.weights
            .iter()
            .map(|w| format!("{w:.6}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Sweeps: {}", info.iterations);
    println!("Converged: {}", info.converged);
    println!(
        "Training accuracy: {:.2}%",
        model.evaluate(&dataset) * 100.0
    );

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let config = load_config(&args.trainer)?;
    let train = load_dataset(&args.train)?;
    let test = DenseDataset::from_csv_file(&args.test)?;

    if test.features().ncols() != train.features().ncols() {
        return Err(SVMError::DimensionMismatch {
            expected: train.features().ncols(),
            actual: test.features().ncols(),
        });
    }

    let model = train_model(config, &train)?;
    let metrics = model.evaluate_detailed(&test);

    println!("=== Model Evaluation ===");
    println!("Training file: {:?}", args.train);
    println!("Test file: {:?}", args.test);
    println!("Support vectors: {}", model.info().n_support_vectors);
    print_metrics(&metrics);

    Ok(())
}

fn print_metrics(metrics: &EvaluationMetrics) {
    println!("\nTest Results:");
    println!("  Accuracy:        {:.2}%", metrics.accuracy() * 100.0);
    println!("  True Positives:  {}", metrics.true_positives);
    println!("  True Negatives:  {}", metrics.true_negatives);
    println!("  False Positives: {}", metrics.false_positives);
    println!("  False Negatives: {}", metrics.false_negatives);
    println!("  Precision:       {:.4}", metrics.precision());
    println!("  Recall:          {:.4}", metrics.recall());
    println!("  F1 Score:        {:.4}", metrics.f1_score());
    println!("  Specificity:     {:.4}", metrics.specificity());
}
