//! pwaffine CLI - learn and apply piecewise affine models
//!
//! Provides subcommands for:
//! - `train`: learn a model from a text dataset, print it or save it as JSON
//! - `infer`: evaluate a saved model on a labelled dataset
//! - `stats`: print region count and guard complexity of a saved model

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use pwaffine::baseline::GaussianNaiveBayes;
use pwaffine::data::io::load_text;
use pwaffine::data::Dataset;
use pwaffine::inference::{infer, Predictor};
use pwaffine::model::{GuardParams, OracleParams, PwaConfig, PwaModel};
use pwaffine::persist::{JsonWriteOptions, SerializableModel};
use pwaffine::training::Verbosity;
use pwaffine::{run_with_threads, Parallelism};

#[derive(Parser, Debug)]
#[command(name = "pwaffine")]
#[command(about = "Learn piecewise affine models with CNF guards", long_about = None)]
struct Cli {
    /// Increase logging (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Learn a model from a training data file
    Train(TrainArgs),
    /// Evaluate a model on a test data file
    Infer(InferArgs),
    /// Print model statistics
    Stats(StatsArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModelKind {
    Piecewise,
    NaiveBayes,
}

#[derive(Parser, Debug)]
struct TrainArgs {
    /// Training data: one sample per line, comma separated, label last
    data: PathBuf,

    /// Residual threshold
    #[arg(short, long, default_value = "0.5")]
    threshold: f32,

    /// Write the model as JSON instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Split budget per guard
    #[arg(short = 's', long, default_value = "100")]
    max_splits: usize,

    /// Learn in raw feature units
    #[arg(long)]
    no_normalize: bool,

    /// Guards of single-axis thresholds only
    #[arg(long)]
    axis_aligned: bool,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// Worker threads (default: all cores)
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    #[arg(long, value_enum, default_value = "piecewise")]
    model: ModelKind,
}

#[derive(Parser, Debug)]
struct InferArgs {
    /// Test data: one sample per line, comma separated, label last
    data: PathBuf,

    /// Model JSON file
    #[arg(short, long)]
    model_path: PathBuf,

    /// Error threshold for precision
    #[arg(short, long)]
    threshold: Option<f32>,

    #[arg(long, value_enum, default_value = "piecewise")]
    model: ModelKind,
}

#[derive(Parser, Debug)]
struct StatsArgs {
    /// Model JSON file
    model: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Train(args) => run_train(args, cli.verbose),
        Commands::Infer(args) => run_infer(args),
        Commands::Stats(args) => run_stats(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_data(path: &Path) -> Result<Dataset> {
    let data = load_text(path).with_context(|| format!("failed to load data from {}", path.display()))?;
    log::info!("loaded {} samples with {} features", data.len(), data.n_features());
    Ok(data)
}

fn run_train(args: TrainArgs, verbose: u8) -> Result<()> {
    let data = load_data(&args.data)?;
    let options = JsonWriteOptions::pretty();

    if args.model == ModelKind::NaiveBayes {
        let nb = GaussianNaiveBayes::fit(&data).context("training naive Bayes model")?;
        match &args.output {
            Some(path) => nb
                .save_json(path, &options)
                .with_context(|| format!("failed to write {}", path.display()))?,
            None => println!("{}", nb.to_json_string(&options)?),
        }
        return Ok(());
    }

    let oracle = if args.axis_aligned { OracleParams::axis_aligned() } else { OracleParams::default() };
    let verbosity = match verbose {
        0 => Verbosity::Warning,
        1 => Verbosity::Info,
        _ => Verbosity::Debug,
    };
    let config = PwaConfig::builder()
        .threshold(args.threshold)
        .normalize(!args.no_normalize)
        .guard(GuardParams::default().with_max_splits(args.max_splits))
        .oracle(oracle)
        .seed(args.seed)
        .maybe_n_threads(args.threads)
        .verbosity(verbosity)
        .build()
        .context("invalid training configuration")?;

    // inexact, dropped and uncovered regions are reported by the training logger
    let model = PwaModel::train(&data, config).context("training failed")?;

    match &args.output {
        Some(path) => {
            model
                .save_json(path, &options)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {} regions to {}", model.model().n_regions(), path.display());
        }
        None => print!("{}", model.display_raw()),
    }
    Ok(())
}

fn run_infer(args: InferArgs) -> Result<()> {
    let data = load_data(&args.data)?;
    let predictor: Box<dyn Predictor> = match args.model {
        ModelKind::Piecewise => Box::new(load_model(&args.model_path)?),
        ModelKind::NaiveBayes => Box::new(
            GaussianNaiveBayes::load_json(&args.model_path)
                .with_context(|| format!("failed to load {}", args.model_path.display()))?,
        ),
    };
    let report = run_with_threads(0, |parallelism: Parallelism| {
        infer(predictor.as_ref(), &data, args.threshold, parallelism)
    });
    print!("{report}");
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    print!("{}", model.summary());
    Ok(())
}

fn load_model(path: &Path) -> Result<PwaModel> {
    PwaModel::load_json(path).with_context(|| format!("failed to load model {}", path.display()))
}
