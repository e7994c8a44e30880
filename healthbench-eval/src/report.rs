//! Report writers for evaluation results.
//!
//! [`ReportGenerator`] collects results and renders them as a flat CSV, a
//! detailed JSON report and a console summary.

use crate::metrics::MetricsSnapshot;
use crate::results::EvaluationResult;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column order of the result CSV.
pub const CSV_HEADER: [&str; 8] = [
    "arquivo",
    "titulo",
    "idx_local",
    "pergunta",
    "esperado",
    "pred",
    "correta",
    "resposta_bruta",
];

/// Default CSV output path.
pub const DEFAULT_CSV_PATH: &str = "resultados_avaliacao.csv";

/// Errors that can occur when writing reports.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// Failed to write a report file
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode CSV
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to encode JSON
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Detailed report document.
#[derive(Debug, Serialize)]
pub struct DetailedReport<'a> {
    /// Generation time (RFC 3339, local time)
    pub timestamp: String,
    /// Aggregate metrics
    pub metrics: MetricsSnapshot,
    /// Every result, untransformed
    pub results: &'a [EvaluationResult],
}

/// Accumulates results and writes reports.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_path: PathBuf,
    results: Vec<EvaluationResult>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CSV_PATH)
    }
}

impl ReportGenerator {
    /// Create a generator writing its CSV to `output_path`.
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            results: Vec::new(),
        }
    }

    /// CSV output path.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Add a single result.
    pub fn add_result(&mut self, result: EvaluationResult) {
        self.results.push(result);
    }

    /// Add multiple results.
    pub fn add_results(&mut self, results: impl IntoIterator<Item = EvaluationResult>) {
        self.results.extend(results);
    }

    /// Results collected so far.
    pub fn results(&self) -> &[EvaluationResult] {
        &self.results
    }

    /// Metrics over the collected results.
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::compute(&self.results)
    }

    /// Render the CSV to a string.
    pub fn to_csv_string(&self) -> Result<String, ReportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write the CSV to the output path, creating parent directories.
    ///
    /// An empty result set still writes the header.
    pub fn write_csv(&self) -> Result<PathBuf, ReportError> {
        if self.results.is_empty() {
            log::warn!("No results to save, writing header only");
        }
        ensure_parent(&self.output_path)?;

        let mut writer = csv::Writer::from_path(&self.output_path)?;
        self.write_records(&mut writer)?;
        writer.flush()?;

        log::info!("CSV saved to {}", self.output_path.display());
        Ok(self.output_path.clone())
    }

    fn write_records<W: std::io::Write>(
        &self,
        writer: &mut csv::Writer<W>,
    ) -> Result<(), ReportError> {
        writer.write_record(CSV_HEADER)?;
        for result in &self.results {
            writer.write_record(result.csv_record())?;
        }
        Ok(())
    }

    /// Build the detailed report document.
    pub fn detailed_report(&self) -> DetailedReport<'_> {
        DetailedReport {
            timestamp: chrono::Local::now().to_rfc3339(),
            metrics: self.metrics(),
            results: &self.results,
        }
    }

    /// Path of the detailed report derived from the CSV path.
    pub fn default_detailed_path(&self) -> PathBuf {
        detailed_path_for(&self.output_path)
    }

    /// Write the detailed JSON report to `path`, or next to the CSV.
    pub fn write_detailed_report(&self, path: Option<&Path>) -> Result<PathBuf, ReportError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_detailed_path());
        ensure_parent(&path)?;

        let json = serde_json::to_string_pretty(&self.detailed_report())?;
        std::fs::write(&path, json)?;

        log::info!("Detailed report saved to {}", path.display());
        Ok(path)
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self, model_name: Option<&str>) {
        let metrics = self.metrics();

        println!();
        println!("{}", "=".repeat(50));
        println!("{}RESUMO DA AVALIAÇÃO", " ".repeat(15));
        println!("{}", "=".repeat(50));
        if let Some(model) = model_name.filter(|m| !m.is_empty()) {
            println!("Modelo:           {}", model);
        }
        println!(
            "Data:             {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        println!("Total perguntas:  {}", metrics.total);
        println!("Acertos:          {}", metrics.correct);
        println!("Erros:            {}", metrics.errors);
        println!("Acurácia:         {:.4}", metrics.accuracy);
        println!("Sem resposta:     {}", metrics.no_answer);

        if !metrics.by_source.is_empty() {
            println!();
            println!("{}", "-".repeat(50));
            println!("Acurácia por arquivo:");
            for (source, stats) in metrics.by_source.iter() {
                println!(
                    "  {}: {:.4} ({}/{})",
                    source, stats.accuracy, stats.correct, stats.total
                );
            }
        }
        println!("{}", "=".repeat(50));
    }
}

/// Replace a `.csv` suffix with `_detailed.json`, or append it otherwise.
pub fn detailed_path_for(csv_path: &Path) -> PathBuf {
    let file_name = csv_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_CSV_PATH);
    let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
    csv_path.with_file_name(format!("{}_detailed.json", stem))
}

pub(crate) fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{QuestionItem, Verdict};

    fn result(source: &str, response: &str) -> EvaluationResult {
        let item = QuestionItem {
            source_id: source.to_string(),
            group_title: "Cardio".to_string(),
            question: "Pergunta\ncom quebra ".to_string(),
            expected: Verdict::True,
            local_index: 0,
        };
        EvaluationResult::answered(&item, response.to_string())
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let csv = ReportGenerator::default().to_csv_string().unwrap();
        assert_eq!(
            csv.trim_end(),
            "arquivo,titulo,idx_local,pergunta,esperado,pred,correta,resposta_bruta"
        );
    }

    #[test]
    fn test_csv_rows() {
        let mut report = ReportGenerator::default();
        report.add_result(result("doc1", "Ok\nResposta: Verdadeiro"));
        report.add_result(result("doc2", "sem palavra"));

        let csv = report.to_csv_string().unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "doc1,Cardio,0,Pergunta com quebra,Verdadeiro,Verdadeiro,1,Ok\\nResposta: Verdadeiro"
        );
        assert_eq!(
            lines[2],
            "doc2,Cardio,0,Pergunta com quebra,Verdadeiro,,0,sem palavra"
        );
    }

    #[test]
    fn test_csv_quotes_commas() {
        let mut report = ReportGenerator::default();
        report.add_result(result("doc1", "Sim, Verdadeiro"));
        let csv = report.to_csv_string().unwrap();
        assert!(csv.contains("\"Sim, Verdadeiro\""));
    }

    #[test]
    fn test_detailed_path_for() {
        assert_eq!(
            detailed_path_for(Path::new("out/resultados.csv")),
            PathBuf::from("out/resultados_detailed.json")
        );
        assert_eq!(
            detailed_path_for(Path::new("report")),
            PathBuf::from("report_detailed.json")
        );
    }

    #[test]
    fn test_add_results_accumulates() {
        let mut report = ReportGenerator::new("x.csv");
        report.add_results(vec![result("a", "Verdadeiro"), result("b", "Falso")]);
        report.add_result(result("c", "Verdadeiro"));

        assert_eq!(report.results().len(), 3);
        let metrics = report.metrics();
        assert_eq!(metrics.correct, 2);
        assert_eq!(report.output_path(), Path::new("x.csv"));
    }

    #[test]
    fn test_detailed_report_keeps_raw_response() {
        let mut report = ReportGenerator::default();
        report.add_result(result("doc1", "linha 1\nResposta: Verdadeiro"));

        let json = serde_json::to_value(report.detailed_report()).unwrap();
        assert_eq!(
            json["results"][0]["resposta_bruta"],
            "linha 1\nResposta: Verdadeiro"
        );
        assert_eq!(json["metrics"]["total"], 1);
        assert!(json["timestamp"].is_string());
    }
}
