//! # HealthBench Eval
//!
//! Evaluation framework for the HealthBench-BR true/false medical benchmark.
//!
//! ## Overview
//!
//! - **Dataset**: Load question blocks and label them by the pairing contract
//! - **Parser**: Extract `Verdadeiro`/`Falso` from free-text responses
//! - **Harness**: Chunked, bounded-concurrency execution against a provider
//! - **Metrics & reports**: Accuracy breakdowns, CSV, detailed JSON and
//!   cross-provider summaries
//!
//! ## Architecture
//!
//! ```text
//! healthbench-core (provider port, adapters)
//!     ↓
//! healthbench-eval (dataset, parser, harness, reports)  ← this crate
//!     ↓
//! healthbench-cli (config files, batch runs, binaries)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use healthbench_core::MockProvider;
//! use healthbench_eval::{BenchmarkFile, EvalConfig, EvalHarness, ReportGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::constant("Resposta: Verdadeiro");
//! let dataset = BenchmarkFile::new("benchmark_perguntas_unificado.json");
//!
//! let harness = EvalHarness::new(EvalConfig::new().with_parallelism(10));
//! let results = harness.evaluate_dataset(&provider, &dataset, |_| {}).await?;
//!
//! let mut report = ReportGenerator::new("resultados_avaliacao.csv");
//! report.add_results(results);
//! report.write_csv()?;
//! report.print_summary(Some("mock"));
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod harness;
pub mod metrics;
pub mod parser;
pub mod report;
pub mod results;
pub mod summary;

// Re-export public API
pub use dataset::{pair_blocks, BenchmarkFile, Dataset, DatasetError, DatasetLoader, QuestionBlock};
pub use harness::{
    EvalConfig, EvalError, EvalHarness, EvalProgress, DEFAULT_PARALLELISM, DEFAULT_SYSTEM_PROMPT,
};
pub use metrics::{accuracy, GroupBreakdown, GroupStats, MetricsSnapshot};
pub use parser::{parse_label, score_response};
pub use report::{detailed_path_for, DetailedReport, ReportError, ReportGenerator, CSV_HEADER};
pub use results::{EvaluationResult, ItemOutcome, QuestionItem, Verdict, CALL_ERROR_MARKER};
pub use summary::{BatchSummary, ProviderRun, RunStatus};
