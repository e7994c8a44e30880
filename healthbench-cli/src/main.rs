//! healthbench - evaluate one provider on the HealthBench-BR true/false benchmark.

use anyhow::{Context, Result};
use clap::Parser;
use healthbench_cli::{init_logging, ProgressReporter};
use healthbench_core::{build_provider, BedrockSettings, ProviderKind, ProviderSettings};
use healthbench_eval::{BenchmarkFile, DatasetLoader, EvalConfig, EvalHarness, ReportGenerator};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

/// Evaluate an LLM on the HealthBench-BR true/false medical benchmark.
#[derive(Parser, Debug)]
#[command(name = "healthbench")]
#[command(about = "Evaluate an LLM provider on the HealthBench-BR true/false benchmark")]
#[command(version)]
struct Args {
    /// Provider backend
    #[arg(long, value_parser = ["maritaca", "openai", "ollama", "bedrock"])]
    provider: String,

    /// Model name (e.g. sabia-3, gpt-4o, llama3, claude-3-haiku)
    #[arg(long)]
    model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// Maximum tokens per response
    #[arg(long, default_value_t = 12000)]
    max_tokens: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Retries per call after the first attempt
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// API key for openai/maritaca (can also use HEALTHBENCH_API_KEY env var)
    #[arg(long, env = "HEALTHBENCH_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL override (e.g. a remote Ollama server)
    #[arg(long)]
    base_url: Option<String>,

    /// Bedrock API key (can also use AWS_BEARER_TOKEN_BEDROCK env var)
    #[arg(long, env = "AWS_BEARER_TOKEN_BEDROCK", hide_env_values = true)]
    aws_bearer_token: Option<String>,

    /// AWS region for Bedrock
    #[arg(long, default_value = "us-east-1")]
    aws_region: String,

    /// Path to the benchmark dataset
    #[arg(long, default_value = "benchmark_perguntas_unificado.json")]
    dataset_path: PathBuf,

    /// Evaluate only the first N questions
    #[arg(long)]
    limit: Option<usize>,

    /// Concurrent provider calls per chunk
    #[arg(long, default_value_t = 10)]
    parallelism: usize,

    /// CSV output path
    #[arg(long, default_value = "resultados_avaliacao.csv")]
    csv_out: PathBuf,

    /// Also write a detailed JSON report next to the CSV
    #[arg(long)]
    detailed_report: bool,

    /// Treat dataset blocks without questions as empty instead of failing
    #[arg(long)]
    lenient_dataset: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Validate CLI arguments.
    fn validate(&self) -> Result<(), String> {
        let kind = self.provider_kind()?;

        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }

        if kind.requires_api_key() && is_blank(&self.api_key) {
            return Err(format!(
                "API key required for provider '{}'. Use --api-key or set HEALTHBENCH_API_KEY.",
                self.provider
            ));
        }

        if kind == ProviderKind::Bedrock && is_blank(&self.aws_bearer_token) {
            return Err(
                "AWS bearer token required for bedrock. Use --aws-bearer-token or set AWS_BEARER_TOKEN_BEDROCK."
                    .to_string(),
            );
        }

        if self.parallelism == 0 {
            return Err("parallelism must be greater than 0".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature ({}) must be between 0.0 and 2.0",
                self.temperature
            ));
        }

        Ok(())
    }

    fn provider_kind(&self) -> Result<ProviderKind, String> {
        ProviderKind::from_str(&self.provider).map_err(|e| e.to_string())
    }

    /// Build ProviderSettings from CLI arguments.
    fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings::new(self.model.clone())
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_retries(self.max_retries)
            .with_api_key(self.api_key.clone())
            .with_base_url(self.base_url.clone())
    }

    /// Build BedrockSettings from CLI arguments.
    fn bedrock_settings(&self) -> BedrockSettings {
        BedrockSettings::new(self.aws_region.clone())
            .with_bearer_token(self.aws_bearer_token.clone())
    }

    /// Build EvalConfig from CLI arguments.
    fn eval_config(&self) -> EvalConfig {
        EvalConfig::new()
            .with_parallelism(self.parallelism)
            .with_limit(self.limit)
    }

    fn dataset_loader(&self) -> DatasetLoader {
        if self.lenient_dataset {
            DatasetLoader::lenient()
        } else {
            DatasetLoader::new()
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

async fn run_evaluation(args: &Args) -> Result<()> {
    let kind = args.provider_kind().map_err(anyhow::Error::msg)?;
    let provider = build_provider(kind, args.provider_settings(), args.bedrock_settings())
        .context("Failed to create provider")?;

    let dataset = BenchmarkFile::new(&args.dataset_path).with_loader(args.dataset_loader());
    let harness = EvalHarness::new(args.eval_config());
    let progress = ProgressReporter::new(!args.no_progress, provider.name());

    let results = harness
        .evaluate_dataset(provider.as_ref(), &dataset, |event| progress.handle(event))
        .await
        .context("Evaluation failed")?;
    progress.finish();

    let mut report = ReportGenerator::new(&args.csv_out);
    report.add_results(results);

    let csv_path = report.write_csv().context("Failed to write CSV")?;
    eprintln!("CSV saved to: {}", csv_path.display());

    if args.detailed_report {
        let json_path = report
            .write_detailed_report(None)
            .context("Failed to write detailed report")?;
        eprintln!("Detailed report saved to: {}", json_path.display());
    }

    report.print_summary(Some(provider.name()));
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose);

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    eprintln!("=== HealthBench-BR ===");
    eprintln!("Provider: {}", args.provider);
    eprintln!("Model: {}", args.model);
    eprintln!("Dataset: {}", args.dataset_path.display());
    eprintln!(
        "Limit: {}",
        args.limit
            .filter(|&l| l > 0)
            .map(|l| l.to_string())
            .unwrap_or_else(|| "all".to_string())
    );
    eprintln!("Parallelism: {}", args.parallelism);
    eprintln!();

    match run_evaluation(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
