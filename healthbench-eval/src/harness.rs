//! Evaluation harness for chunked execution.
//!
//! The [`EvalHarness`] sends every item to a provider, at most
//! `parallelism` calls at a time. Items are split into consecutive chunks of
//! that size; chunks run one after another and a chunk's calls run
//! concurrently. A failed call becomes an unknown, incorrect result and
//! never aborts the run. After each chunk the running accuracy is logged
//! and reported through [`EvalProgress`].

use crate::dataset::{Dataset, DatasetError};
use crate::results::{EvaluationResult, QuestionItem};
use futures_util::future::join_all;
use healthbench_core::Provider;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// System prompt sent with every question.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Você está sendo avaliado em um benchmark de VERDADEIRO ou FALSO (pt-BR).\n\
Explique brevemente se quiser, MAS OBRIGATORIAMENTE termine a mensagem com uma linha final EXATA:\n\
Resposta: Verdadeiro\n\
ou\n\
Resposta: Falso\n\
A linha 'Resposta:' DEVE aparecer exatamente assim, com 'Verdadeiro' ou 'Falso' no fim.";

/// Default number of in-flight provider calls.
pub const DEFAULT_PARALLELISM: usize = 10;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// Failed to load dataset
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Progress events emitted during evaluation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EvalProgress {
    /// Evaluation starting.
    Started {
        /// Number of items that will be evaluated.
        total: usize,
        /// Number of chunks.
        chunks: usize,
    },
    /// One item finished (answered, unparseable or failed).
    ItemCompleted {
        /// Items completed so far.
        completed: usize,
        /// Total items.
        total: usize,
        /// Whether the provider call failed.
        call_failed: bool,
    },
    /// A chunk finished.
    ChunkCompleted {
        /// 1-based chunk number.
        chunk: usize,
        /// Total chunks.
        chunks: usize,
        /// Items completed so far.
        completed: usize,
        /// Total items.
        total: usize,
        /// Correct items so far.
        correct: usize,
    },
}

impl EvalProgress {
    /// Accuracy over the completed items, for chunk events.
    pub fn running_accuracy(&self) -> Option<f64> {
        match self {
            EvalProgress::ChunkCompleted {
                completed, correct, ..
            } if *completed > 0 => Some(*correct as f64 / *completed as f64),
            _ => None,
        }
    }
}

/// Configuration for the evaluation harness.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct EvalConfig {
    /// Maximum number of concurrent provider calls (default: 10, minimum 1)
    pub parallelism: usize,

    /// Evaluate only the first N items
    pub limit: Option<usize>,

    /// System prompt sent with every question
    pub system_prompt: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            limit: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl EvalConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parallelism. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Evaluate only the first `limit` items. `Some(0)` means no limit.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&n| n > 0);
        self
    }

    /// Replace the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// Evaluation harness for running a provider over labeled items.
///
/// # Example
///
/// ```
/// use healthbench_core::MockProvider;
/// use healthbench_eval::{EvalConfig, EvalHarness, QuestionItem, Verdict};
///
/// # async fn example() {
/// let provider = MockProvider::constant("Resposta: Verdadeiro");
/// let items = vec![QuestionItem {
///     source_id: "doc1".into(),
///     group_title: "Cardio".into(),
///     question: "A hipertensão é fator de risco cardiovascular?".into(),
///     expected: Verdict::True,
///     local_index: 0,
/// }];
///
/// let harness = EvalHarness::new(EvalConfig::new().with_parallelism(4));
/// let results = harness.evaluate(&provider, &items).await;
/// assert!(results[0].is_correct);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvalHarness {
    config: EvalConfig,
}

impl EvalHarness {
    /// Create a new harness with the given configuration.
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// The harness configuration.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Load `dataset` and evaluate it.
    pub async fn evaluate_dataset<D, F>(
        &self,
        provider: &dyn Provider,
        dataset: &D,
        on_progress: F,
    ) -> Result<Vec<EvaluationResult>, EvalError>
    where
        D: Dataset,
        F: Fn(EvalProgress) + Send + Sync,
    {
        let items = dataset.load().await?;
        log::info!(
            "Evaluating {} with {} ({} questions)",
            dataset.name(),
            provider.name(),
            items.len()
        );
        Ok(self.evaluate_with_progress(provider, &items, on_progress).await)
    }

    /// Evaluate items without progress reporting.
    pub async fn evaluate(
        &self,
        provider: &dyn Provider,
        items: &[QuestionItem],
    ) -> Vec<EvaluationResult> {
        self.evaluate_with_progress(provider, items, |_| {}).await
    }

    /// Evaluate items, reporting progress through `on_progress`.
    ///
    /// Returns exactly one result per evaluated item, in input order.
    pub async fn evaluate_with_progress<F>(
        &self,
        provider: &dyn Provider,
        items: &[QuestionItem],
        on_progress: F,
    ) -> Vec<EvaluationResult>
    where
        F: Fn(EvalProgress) + Send + Sync,
    {
        let items = match self.config.limit {
            Some(limit) => &items[..limit.min(items.len())],
            None => items,
        };
        let total = items.len();
        if total == 0 {
            log::info!("No questions to evaluate");
            return Vec::new();
        }

        let parallelism = self.config.parallelism.max(1);
        let chunks = total.div_ceil(parallelism);
        on_progress(EvalProgress::Started { total, chunks });
        log::info!(
            "Evaluating {} questions with {} in {} chunks of up to {}",
            total,
            provider.name(),
            chunks,
            parallelism
        );

        let completed = AtomicUsize::new(0);
        let mut results = Vec::with_capacity(total);
        let mut correct = 0;

        for (chunk_index, chunk) in items.chunks(parallelism).enumerate() {
            let chunk_results = join_all(chunk.iter().map(|item| {
                let completed = &completed;
                let on_progress = &on_progress;
                async move {
                    let result = evaluate_item(provider, &self.config.system_prompt, item).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    on_progress(EvalProgress::ItemCompleted {
                        completed: done,
                        total,
                        call_failed: result.call_failed,
                    });
                    result
                }
            }))
            .await;

            correct += chunk_results.iter().filter(|r| r.is_correct).count();
            results.extend(chunk_results);

            log::info!(
                "Partial accuracy: {}/{} = {:.3}",
                correct,
                results.len(),
                correct as f64 / results.len() as f64
            );
            on_progress(EvalProgress::ChunkCompleted {
                chunk: chunk_index + 1,
                chunks,
                completed: results.len(),
                total,
                correct,
            });
        }

        results
    }
}

async fn evaluate_item(
    provider: &dyn Provider,
    system_prompt: &str,
    item: &QuestionItem,
) -> EvaluationResult {
    match provider.invoke(system_prompt, &item.question).await {
        Ok(response) => EvaluationResult::answered(item, response),
        Err(e) => {
            log::warn!(
                "Call failed for {} #{}: {}",
                item.source_id,
                item.local_index,
                e
            );
            EvaluationResult::failed_call(item, &e)
        }
    }
}
