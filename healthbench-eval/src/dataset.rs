//! Dataset loading for the benchmark.
//!
//! The benchmark file is a JSON array of blocks. Each block carries a
//! source identifier (`arquivo`), a group title (`titulo`) and a list of
//! questions (`perguntas`). Questions come in adjacent pairs: the first of
//! each pair is true, the second is false. A trailing unpaired question is
//! dropped.
//!
//! ```json
//! [
//!   {"arquivo": "doc1", "titulo": "Cardiologia",
//!    "perguntas": ["afirmação verdadeira", "afirmação falsa"]}
//! ]
//! ```

use crate::results::{QuestionItem, Verdict};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors that can occur when loading datasets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DatasetError {
    /// Dataset file does not exist
    #[error("Dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Dataset is valid JSON but not shaped like a block list
    #[error("Malformed dataset: {0}")]
    Malformed(String),

    /// Failed to read dataset file
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset is not valid JSON
    #[error("Failed to parse dataset: {0}")]
    Parse(String),
}

/// A block of questions sharing a source and a title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBlock {
    /// Source identifier (`arquivo`)
    pub source_id: String,
    /// Group title (`titulo`)
    pub title: String,
    /// Questions in pair order (`perguntas`)
    pub questions: Vec<String>,
}

/// Flatten blocks into labeled items using the pairing contract.
///
/// For each block, questions `2k` and `2k + 1` form a pair: the first is
/// expected [`Verdict::True`], the second [`Verdict::False`]. Items keep
/// block order and in-block order; `local_index` is the position in the
/// block's question list.
pub fn pair_blocks(blocks: &[QuestionBlock]) -> Vec<QuestionItem> {
    let mut items = Vec::new();
    for block in blocks {
        for (pair_index, pair) in block.questions.chunks_exact(2).enumerate() {
            for (offset, question) in pair.iter().enumerate() {
                items.push(QuestionItem {
                    source_id: block.source_id.clone(),
                    group_title: block.title.clone(),
                    question: question.clone(),
                    expected: Verdict::for_pair_offset(offset),
                    local_index: pair_index * 2 + offset,
                });
            }
        }
    }
    items
}

/// Trait for evaluation datasets.
///
/// Implement this trait to feed the harness from a source other than the
/// benchmark file.
pub trait Dataset: Send + Sync {
    /// The name of this dataset (used in logs and reports).
    fn name(&self) -> &str;

    /// Load all labeled items.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<QuestionItem>, DatasetError>> + Send;
}

/// Parses benchmark block lists.
///
/// Strict by default: a block without `perguntas`, a non-string question or
/// an empty question is rejected as [`DatasetError::Malformed`]. Lenient
/// mode accepts missing or null `perguntas` as an empty list and logs a
/// warning instead.
#[derive(Debug, Clone, Copy)]
pub struct DatasetLoader {
    strict: bool,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self { strict: true }
    }
}

impl DatasetLoader {
    /// Create a strict loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that tolerates blocks without questions.
    pub fn lenient() -> Self {
        Self { strict: false }
    }

    /// Whether this loader rejects incomplete blocks.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Read `path` and produce labeled items.
    pub async fn load(&self, path: &Path) -> Result<Vec<QuestionItem>, DatasetError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DatasetError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        let items = self.parse(&content)?;
        log::info!("Loaded {} questions from {}", items.len(), path.display());
        Ok(items)
    }

    /// Parse a JSON document and produce labeled items.
    pub fn parse(&self, json: &str) -> Result<Vec<QuestionItem>, DatasetError> {
        let blocks = self.parse_blocks(json)?;
        Ok(pair_blocks(&blocks))
    }

    /// Parse a JSON document into blocks without pairing.
    pub fn parse_blocks(&self, json: &str) -> Result<Vec<QuestionBlock>, DatasetError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| DatasetError::Parse(e.to_string()))?;

        let entries = value.as_array().ok_or_else(|| {
            DatasetError::Malformed("top-level value must be an array of blocks".to_string())
        })?;

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.parse_block(index, entry))
            .collect()
    }

    fn parse_block(&self, index: usize, entry: &Value) -> Result<QuestionBlock, DatasetError> {
        let object = entry
            .as_object()
            .ok_or_else(|| DatasetError::Malformed(format!("block {} is not an object", index)))?;

        let source_id = string_field(object, "arquivo", index)?;
        let title = string_field(object, "titulo", index)?;

        let questions = match object.get("perguntas") {
            Some(Value::Array(values)) => values
                .iter()
                .enumerate()
                .map(|(q, value)| self.question_text(index, q, value))
                .collect::<Result<Vec<_>, _>>()?,
            None | Some(Value::Null) if self.strict => {
                return Err(DatasetError::Malformed(format!(
                    "block {} ({}) has no 'perguntas' list",
                    index, source_id
                )))
            }
            None | Some(Value::Null) => {
                log::warn!(
                    "Block {} ({}) has no 'perguntas' list, treating as empty",
                    index,
                    source_id
                );
                Vec::new()
            }
            Some(_) => {
                return Err(DatasetError::Malformed(format!(
                    "block {} has a 'perguntas' field that is not a list",
                    index
                )))
            }
        };

        if questions.len() % 2 == 1 {
            log::warn!(
                "Block {} ({}) has an odd number of questions, dropping the last one",
                index,
                source_id
            );
        }

        Ok(QuestionBlock {
            source_id,
            title,
            questions,
        })
    }

    fn question_text(
        &self,
        block: usize,
        position: usize,
        value: &Value,
    ) -> Result<String, DatasetError> {
        let text = value.as_str().ok_or_else(|| {
            DatasetError::Malformed(format!(
                "question {} of block {} is not a string",
                position, block
            ))
        })?;

        if self.strict && text.trim().is_empty() {
            return Err(DatasetError::Malformed(format!(
                "question {} of block {} is empty",
                position, block
            )));
        }
        Ok(text.to_string())
    }
}

/// Missing or null string fields default to empty.
fn string_field(
    object: &serde_json::Map<String, Value>,
    key: &str,
    block: usize,
) -> Result<String, DatasetError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DatasetError::Malformed(format!(
            "field '{}' of block {} is not a string",
            key, block
        ))),
    }
}

/// The benchmark's JSON file as a [`Dataset`].
///
/// # Example
///
/// ```no_run
/// use healthbench_eval::{BenchmarkFile, Dataset};
///
/// # async fn example() -> Result<(), healthbench_eval::DatasetError> {
/// let dataset = BenchmarkFile::new("benchmark_perguntas_unificado.json");
/// let items = dataset.load().await?;
/// println!("Loaded {} questions", items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BenchmarkFile {
    path: PathBuf,
    name: String,
    loader: DatasetLoader,
}

impl BenchmarkFile {
    /// Create a strict dataset from a file path, named after the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("benchmark")
            .to_string();

        Self {
            path,
            name,
            loader: DatasetLoader::new(),
        }
    }

    /// Use the given loader (e.g. [`DatasetLoader::lenient`]).
    #[must_use]
    pub fn with_loader(mut self, loader: DatasetLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Dataset for BenchmarkFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<QuestionItem>, DatasetError> {
        self.loader.load(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn block(source: &str, title: &str, questions: &[&str]) -> QuestionBlock {
        QuestionBlock {
            source_id: source.to_string(),
            title: title.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
        }
    }

    #[test]
    fn test_pair_blocks_labels_alternate() {
        let items = pair_blocks(&[block("a", "T1", &["q0", "q1", "q2", "q3"])]);

        assert_eq!(items.len(), 4);
        let labels: Vec<_> = items.iter().map(|i| i.expected).collect();
        assert_eq!(
            labels,
            vec![Verdict::True, Verdict::False, Verdict::True, Verdict::False]
        );
        let indices: Vec<_> = items.iter().map(|i| i.local_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_pair_blocks_drops_trailing_question() {
        let items = pair_blocks(&[block("a", "T1", &["q0", "q1", "q2"])]);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.question != "q2"));
    }

    #[test]
    fn test_pair_blocks_short_blocks() {
        assert!(pair_blocks(&[block("a", "T", &[])]).is_empty());
        assert!(pair_blocks(&[block("a", "T", &["only"])]).is_empty());
        assert!(pair_blocks(&[]).is_empty());
    }

    #[test]
    fn test_pair_blocks_preserves_block_order() {
        let items = pair_blocks(&[
            block("a", "T1", &["a0", "a1"]),
            block("b", "T2", &["b0", "b1"]),
        ]);
        let order: Vec<_> = items.iter().map(|i| i.question.as_str()).collect();
        assert_eq!(order, vec!["a0", "a1", "b0", "b1"]);
        assert_eq!(items[2].source_id, "b");
        assert_eq!(items[2].group_title, "T2");
    }

    #[test]
    fn test_parse_missing_fields_default_empty() {
        let items = DatasetLoader::new()
            .parse(r#"[{"perguntas": ["x", "y"]}]"#)
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source_id, "");
        assert_eq!(items[0].group_title, "");
    }

    #[test]
    fn test_parse_strict_rejects_missing_questions() {
        let err = DatasetLoader::new()
            .parse(r#"[{"arquivo": "a", "titulo": "T"}]"#)
            .unwrap_err();
        assert!(matches!(err, DatasetError::Malformed(_)));
    }

    #[test]
    fn test_parse_lenient_accepts_missing_questions() {
        let loader = DatasetLoader::lenient();
        assert!(!loader.is_strict());

        let items = loader
            .parse(r#"[{"arquivo": "a"}, {"arquivo": "b", "perguntas": ["x", "y"]}]"#)
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source_id, "b");
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        let loader = DatasetLoader::new();
        assert!(matches!(
            loader.parse(r#"{"arquivo": "a"}"#),
            Err(DatasetError::Malformed(_))
        ));
        assert!(matches!(loader.parse(r#"[42]"#), Err(DatasetError::Malformed(_))));
        assert!(matches!(
            loader.parse(r#"[{"perguntas": "q"}]"#),
            Err(DatasetError::Malformed(_))
        ));
        assert!(matches!(
            loader.parse(r#"[{"perguntas": ["q", 7]}]"#),
            Err(DatasetError::Malformed(_))
        ));
        assert!(matches!(
            loader.parse(r#"[{"arquivo": 3, "perguntas": []}]"#),
            Err(DatasetError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_empty_question_strict_only() {
        let json = r#"[{"perguntas": ["q", "  "]}]"#;
        assert!(DatasetLoader::new().parse(json).is_err());
        assert_eq!(DatasetLoader::lenient().parse(json).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            DatasetLoader::new().parse("[{"),
            Err(DatasetError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = DatasetLoader::new()
            .load(Path::new("/nonexistent/benchmark.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::NotFound(_)));
        assert!(err.to_string().contains("/nonexistent/benchmark.json"));
    }

    #[tokio::test]
    async fn test_benchmark_file_dataset() {
        let json = r#"[
            {"arquivo": "doc1", "titulo": "Cardio", "perguntas": ["v1", "f1", "v2", "f2", "extra"]},
            {"arquivo": "doc2", "titulo": "Neuro", "perguntas": ["v3", "f3"]}
        ]"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let dataset = BenchmarkFile::new(file.path());
        let items = dataset.load().await.unwrap();

        assert_eq!(items.len(), 6);
        assert_eq!(items[4].source_id, "doc2");
        assert_eq!(items[4].expected, Verdict::True);
        assert_eq!(items[5].expected, Verdict::False);
    }

    #[test]
    fn test_benchmark_file_name() {
        let dataset = BenchmarkFile::new("/data/benchmark_perguntas_unificado.json");
        assert_eq!(dataset.name(), "benchmark_perguntas_unificado");
        assert_eq!(
            dataset.path(),
            Path::new("/data/benchmark_perguntas_unificado.json")
        );
    }
}
