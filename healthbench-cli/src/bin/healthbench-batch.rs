//! healthbench-batch - evaluate every provider in a providers file.

use anyhow::{Context, Result};
use clap::Parser;
use healthbench_cli::{init_logging, print_batch_summary, BatchRunner, ConfigLoader};
use healthbench_eval::DatasetLoader;
use std::path::PathBuf;
use std::process::ExitCode;

/// Batch evaluation of multiple LLM providers.
#[derive(Parser, Debug)]
#[command(name = "healthbench-batch")]
#[command(about = "Evaluate multiple LLM providers on the HealthBench-BR benchmark")]
#[command(version)]
struct Args {
    /// Path to the providers configuration file (.json or .toml)
    #[arg(long, default_value = "providers.json")]
    config: PathBuf,

    /// Path to the benchmark dataset
    #[arg(long, default_value = "benchmark_perguntas_unificado.json")]
    dataset: PathBuf,

    /// Providers to evaluate, by name (default: all)
    #[arg(long, num_args = 1..)]
    providers: Vec<String>,

    /// Evaluate only the first N questions per provider
    #[arg(long)]
    limit: Option<usize>,

    /// Directory for run outputs
    #[arg(long, default_value = "evaluation_results")]
    output_dir: PathBuf,

    /// Treat dataset blocks without questions as empty instead of failing
    #[arg(long)]
    lenient_dataset: bool,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

async fn run_batch(args: &Args) -> Result<()> {
    let config = ConfigLoader::load(&args.config).context("Failed to load providers file")?;

    let loader = if args.lenient_dataset {
        DatasetLoader::lenient()
    } else {
        DatasetLoader::new()
    };
    eprintln!("Loading dataset from {}...", args.dataset.display());
    let items = loader
        .load(&args.dataset)
        .await
        .context("Failed to load dataset")?;
    eprintln!("Dataset loaded: {} questions", items.len());
    eprintln!();

    let runner = BatchRunner::new(config)
        .with_limit(args.limit)
        .with_progress(!args.no_progress);

    let runs = runner.run(&items, &args.providers).await?;
    runner
        .save_results(&runs, &args.output_dir)
        .context("Failed to save results")?;
    print_batch_summary(&runs);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose);

    match run_batch(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
