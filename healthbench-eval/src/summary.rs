//! Cross-provider summary for batch runs.

use crate::metrics::{accuracy, MetricsSnapshot};
use crate::report::{ensure_parent, ReportError};
use crate::results::EvaluationResult;
use serde::Serialize;
use std::path::Path;

/// Fixed leading columns of the combined summary.
pub const SUMMARY_COLUMNS: [&str; 8] = [
    "Provider",
    "Model",
    "Type",
    "Status",
    "Error",
    "Total Questions",
    "Correct",
    "Accuracy (%)",
];

/// Whether a provider's evaluation ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// The provider was evaluated
    Completed,
    /// Configuration or construction failed before evaluation
    Failed,
}

impl RunStatus {
    /// Lowercase status label.
    pub const fn as_str(self) -> &'static str {
        match self {
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

/// One provider's outcome within a batch run.
#[derive(Debug, Clone)]
pub struct ProviderRun {
    /// Display name from the configuration
    pub name: String,
    /// Model identifier
    pub model: String,
    /// Provider type (`openai`, `ollama`, ...)
    pub kind: String,
    /// Run status
    pub status: RunStatus,
    /// Failure description for failed runs
    pub error: Option<String>,
    /// Evaluation results (empty for failed runs)
    pub results: Vec<EvaluationResult>,
    /// Completion time (RFC 3339) for completed runs
    pub timestamp: Option<String>,
}

impl ProviderRun {
    /// A provider that was evaluated.
    pub fn completed(
        name: impl Into<String>,
        model: impl Into<String>,
        kind: impl Into<String>,
        results: Vec<EvaluationResult>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            kind: kind.into(),
            status: RunStatus::Completed,
            error: None,
            results,
            timestamp: Some(chrono::Local::now().to_rfc3339()),
        }
    }

    /// A provider that could not be evaluated.
    pub fn failed(
        name: impl Into<String>,
        model: impl Into<String>,
        kind: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            kind: kind.into(),
            status: RunStatus::Failed,
            error: Some(error.into()),
            results: Vec::new(),
            timestamp: None,
        }
    }

    /// File-name stem for this provider's reports (spaces become `_`).
    pub fn file_stem(&self) -> String {
        self.name.replace(' ', "_")
    }

    /// Metrics over this provider's results.
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::compute(&self.results)
    }
}

/// Combined table with one row per provider.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl BatchSummary {
    /// Build the table from provider runs.
    ///
    /// Per-group columns follow first-seen group order across all runs.
    /// Failed runs leave the numeric columns blank.
    pub fn from_runs(runs: &[ProviderRun]) -> Self {
        let mut groups: Vec<&str> = Vec::new();
        for run in runs {
            for result in &run.results {
                if !groups.contains(&result.group_title.as_str()) {
                    groups.push(&result.group_title);
                }
            }
        }

        let header = SUMMARY_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(groups.iter().map(|g| format!("{} Accuracy (%)", g)))
            .collect();

        let rows = runs.iter().map(|run| Self::row(run, &groups)).collect();
        Self { header, rows }
    }

    fn row(run: &ProviderRun, groups: &[&str]) -> Vec<String> {
        let mut row = vec![
            run.name.clone(),
            run.model.clone(),
            run.kind.clone(),
            run.status.as_str().to_string(),
            run.error.clone().unwrap_or_default(),
        ];

        if run.status == RunStatus::Failed {
            row.resize(SUMMARY_COLUMNS.len() + groups.len(), String::new());
            return row;
        }

        let metrics = run.metrics();
        row.push(metrics.total.to_string());
        row.push(metrics.correct.to_string());
        row.push(percent(metrics.accuracy));
        for group in groups {
            row.push(match metrics.by_group.get(group) {
                Some(stats) => percent(accuracy(stats.correct, stats.total)),
                None => String::new(),
            });
        }
        row
    }

    /// Column names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Table rows in run order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Render the table as CSV.
    pub fn to_csv_string(&self) -> Result<String, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write the table as CSV to `path`.
    pub fn write_csv(&self, path: &Path) -> Result<(), ReportError> {
        ensure_parent(path)?;
        let mut writer = csv::Writer::from_path(path)?;
        self.write_records(&mut writer)?;
        writer.flush()?;
        log::info!("Combined summary saved to {}", path.display());
        Ok(())
    }

    fn write_records<W: std::io::Write>(
        &self,
        writer: &mut csv::Writer<W>,
    ) -> Result<(), ReportError> {
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Ok(())
    }

    /// Print the table with aligned columns.
    pub fn print_table(&self) {
        let widths: Vec<usize> = (0..self.header.len())
            .map(|col| {
                std::iter::once(&self.header[col])
                    .chain(self.rows.iter().filter_map(|r| r.get(col)))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_row = |cells: &[String]| {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join("  ")
        };

        println!();
        println!("{}", "=".repeat(60));
        println!("EVALUATION SUMMARY");
        println!("{}", "=".repeat(60));
        println!("{}", format_row(&self.header).trim_end());
        for row in &self.rows {
            println!("{}", format_row(row).trim_end());
        }
        println!("{}", "=".repeat(60));
    }
}

fn percent(ratio: f64) -> String {
    format!("{:.2}", ratio * 100.0)
}
