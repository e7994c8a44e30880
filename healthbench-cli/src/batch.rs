//! Multi-provider batch evaluation.
//!
//! Each selected provider is validated, built and evaluated over the same
//! items, one provider at a time. A provider that fails validation or
//! construction is recorded as failed and the others still run. Results go
//! to a timestamped run directory:
//!
//! ```text
//! <output_dir>/run_<YYYYmmdd_HHMMSS>/
//!     <name>_results.csv
//!     <name>_detailed.json
//!     combined_summary.csv
//!     run_metadata.json
//! ```

use crate::config::{ConfigError, ConfigLoader, ProviderEntry};
use crate::progress::ProgressReporter;
use healthbench_core::build_provider;
use healthbench_eval::{
    BatchSummary, DatasetError, EvalConfig, EvalHarness, ProviderRun, QuestionItem, ReportError,
    ReportGenerator, RunStatus,
};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort a batch run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BatchError {
    /// Providers file could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Dataset could not be loaded
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// A report could not be written
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Run directory or metadata could not be written
    #[error("Failed to write run output: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata could not be encoded
    #[error("Failed to encode run metadata: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing to evaluate
    #[error("No providers to evaluate")]
    NoProviders,
}

/// Per-provider entry of `run_metadata.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    /// `completed` or `failed`
    pub status: RunStatus,
    /// Failure description
    pub error: Option<String>,
    /// Number of results
    pub total_questions: usize,
    /// Completion time
    pub timestamp: Option<String>,
}

/// Contents of `run_metadata.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// Run timestamp (`YYYYmmdd_HHMMSS`)
    pub timestamp: String,
    /// Provider names in evaluation order
    pub providers: Vec<String>,
    /// Per-provider records keyed by name, in evaluation order
    #[serde(serialize_with = "ordered_map")]
    pub results: Vec<(String, RunRecord)>,
}

impl RunMetadata {
    /// Build metadata from finished runs.
    pub fn from_runs(timestamp: &str, runs: &[ProviderRun]) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            providers: runs.iter().map(|r| r.name.clone()).collect(),
            results: runs
                .iter()
                .map(|r| {
                    let record = RunRecord {
                        status: r.status,
                        error: r.error.clone(),
                        total_questions: r.results.len(),
                        timestamp: r.timestamp.clone(),
                    };
                    (r.name.clone(), record)
                })
                .collect(),
        }
    }
}

fn ordered_map<S: Serializer>(
    entries: &[(String, RunRecord)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (name, record) in entries {
        map.serialize_entry(name, record)?;
    }
    map.end()
}

/// Evaluates every configured provider over the same items.
#[derive(Debug)]
pub struct BatchRunner {
    config: ConfigLoader,
    limit: Option<usize>,
    show_progress: bool,
    timestamp: String,
}

impl BatchRunner {
    /// Create a runner for a loaded providers file.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config,
            limit: None,
            show_progress: true,
            timestamp: chrono::Local::now().format("%Y%m%d_%H%M%S").to_string(),
        }
    }

    /// Evaluate only the first `limit` items per provider.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Show a progress bar per provider.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run timestamp used for the output directory.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Providers to evaluate: the named ones, or all when `names` is empty.
    ///
    /// Unknown names are logged and skipped.
    pub fn select_providers(&self, names: &[String]) -> Vec<&ProviderEntry> {
        if names.is_empty() {
            return self.config.providers().iter().collect();
        }

        names
            .iter()
            .filter_map(|name| {
                let entry = self.config.get_provider(name);
                if entry.is_none() {
                    log::warn!("Provider '{}' not found in configuration", name);
                }
                entry
            })
            .collect()
    }

    /// Evaluate one provider. Never fails; problems become a failed run.
    pub async fn evaluate_provider(
        &self,
        entry: &ProviderEntry,
        items: &[QuestionItem],
    ) -> ProviderRun {
        let issues = self.config.validate_provider(entry);
        if !issues.is_empty() {
            log::warn!("Skipping {}: {}", entry.name, issues.join("; "));
            return ProviderRun::failed(&entry.name, &entry.model, &entry.kind, issues.join("\n"));
        }

        let defaults = self.config.default_settings();
        let provider = match entry.provider_kind().and_then(|kind| {
            build_provider(kind, entry.provider_settings(defaults), entry.bedrock_settings())
        }) {
            Ok(provider) => provider,
            Err(e) => {
                log::error!("Failed to create provider {}: {}", entry.name, e);
                return ProviderRun::failed(&entry.name, &entry.model, &entry.kind, e.to_string());
            }
        };

        let harness = EvalHarness::new(
            EvalConfig::new()
                .with_parallelism(defaults.parallelism)
                .with_limit(self.limit),
        );
        let progress = ProgressReporter::new(self.show_progress, &entry.name);
        let results = harness
            .evaluate_with_progress(provider.as_ref(), items, |event| progress.handle(event))
            .await;
        progress.finish();

        ProviderRun::completed(&entry.name, &entry.model, &entry.kind, results)
    }

    /// Evaluate the selected providers in order.
    pub async fn run(
        &self,
        items: &[QuestionItem],
        names: &[String],
    ) -> Result<Vec<ProviderRun>, BatchError> {
        let selected = self.select_providers(names);
        if selected.is_empty() {
            return Err(BatchError::NoProviders);
        }

        eprintln!("Will evaluate {} provider(s):", selected.len());
        for entry in &selected {
            eprintln!("  - {} ({}: {})", entry.name, entry.kind, entry.model);
        }

        let mut runs = Vec::with_capacity(selected.len());
        for entry in selected {
            eprintln!();
            eprintln!("Evaluating {}...", entry.name);
            runs.push(self.evaluate_provider(entry, items).await);
        }
        Ok(runs)
    }

    /// Write all reports into a new run directory and return its path.
    pub fn save_results(
        &self,
        runs: &[ProviderRun],
        output_dir: &Path,
    ) -> Result<PathBuf, BatchError> {
        let run_dir = output_dir.join(format!("run_{}", self.timestamp));
        std::fs::create_dir_all(&run_dir)?;

        for run in runs {
            if run.status != RunStatus::Completed || run.results.is_empty() {
                continue;
            }
            let stem = run.file_stem();
            let mut report = ReportGenerator::new(run_dir.join(format!("{}_results.csv", stem)));
            report.add_results(run.results.iter().cloned());
            report.write_csv()?;
            report.write_detailed_report(Some(&run_dir.join(format!("{}_detailed.json", stem))))?;
            eprintln!("Saved results for {} to {}", run.name, report.output_path().display());
        }

        let summary = BatchSummary::from_runs(runs);
        summary.write_csv(&run_dir.join("combined_summary.csv"))?;
        summary.print_table();

        let metadata = RunMetadata::from_runs(&self.timestamp, runs);
        std::fs::write(
            run_dir.join("run_metadata.json"),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        eprintln!();
        eprintln!("All results saved to: {}", run_dir.display());
        Ok(run_dir)
    }
}

/// Print per-provider status lines.
pub fn print_batch_summary(runs: &[ProviderRun]) {
    println!();
    println!("{}", "=".repeat(60));
    println!("BATCH EVALUATION COMPLETE");
    println!("{}", "=".repeat(60));

    for run in runs {
        println!();
        println!("{}:", run.name);
        println!("  Status: {}", run.status.as_str());
        match run.status {
            RunStatus::Completed => {
                let metrics = run.metrics();
                println!("  Total Questions: {}", metrics.total);
                println!("  Correct: {}", metrics.correct);
                println!("  Accuracy: {:.2}%", metrics.accuracy * 100.0);
            }
            RunStatus::Failed => {
                println!(
                    "  Error: {}",
                    run.error.as_deref().unwrap_or("Unknown error")
                );
            }
        }
    }
}
