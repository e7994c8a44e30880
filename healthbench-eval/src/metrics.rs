//! Accuracy aggregation over evaluation results.

use crate::results::EvaluationResult;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Ratio of `correct` to `total`, or 0 when `total` is 0.
pub fn accuracy(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64
    }
}

/// Counts for one group of results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupStats {
    /// Results in the group
    pub total: usize,
    /// Correct results in the group
    pub correct: usize,
    /// `correct / total`
    pub accuracy: f64,
}

/// Per-key statistics in first-seen key order.
///
/// Serializes as a JSON object keyed by group name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupBreakdown {
    entries: Vec<(String, GroupStats)>,
}

impl GroupBreakdown {
    fn from_key<'a>(
        results: &'a [EvaluationResult],
        key: impl Fn(&'a EvaluationResult) -> &'a str,
    ) -> Self {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(String, usize, usize)> = Vec::new();

        for result in results {
            let name = key(result);
            let position = *positions.entry(name).or_insert_with(|| {
                counts.push((name.to_string(), 0, 0));
                counts.len() - 1
            });
            let entry = &mut counts[position];
            entry.1 += 1;
            if result.is_correct {
                entry.2 += 1;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(name, total, correct)| {
                let stats = GroupStats {
                    total,
                    correct,
                    accuracy: accuracy(correct, total),
                };
                (name, stats)
            })
            .collect();
        Self { entries }
    }

    /// Statistics for `group`, if it appeared.
    pub fn get(&self, group: &str) -> Option<&GroupStats> {
        self.entries
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, stats)| stats)
    }

    /// Iterate groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupStats)> {
        self.entries.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    /// Group names in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no groups.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for GroupBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, stats) in &self.entries {
            map.serialize_entry(name, stats)?;
        }
        map.end()
    }
}

/// Aggregate metrics for a set of results.
///
/// Serialized keys match the detailed report format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    /// Number of results
    pub total: usize,

    /// Correct results
    #[serde(rename = "acertos")]
    pub correct: usize,

    /// `total - correct`
    #[serde(rename = "erros")]
    pub errors: usize,

    /// `correct / total` (0 when empty)
    #[serde(rename = "acuracia")]
    pub accuracy: f64,

    /// Results with no verdict (parse failures and call failures)
    #[serde(rename = "sem_resposta")]
    pub no_answer: usize,

    /// Breakdown by source identifier
    #[serde(rename = "por_arquivo")]
    pub by_source: GroupBreakdown,

    /// Breakdown by group title
    #[serde(rename = "por_titulo")]
    pub by_group: GroupBreakdown,
}

impl MetricsSnapshot {
    /// Compute metrics from results.
    pub fn compute(results: &[EvaluationResult]) -> Self {
        let total = results.len();
        let correct = results.iter().filter(|r| r.is_correct).count();
        let no_answer = results.iter().filter(|r| r.is_unknown()).count();

        Self {
            total,
            correct,
            errors: total - correct,
            accuracy: accuracy(correct, total),
            no_answer,
            by_source: GroupBreakdown::from_key(results, |r| r.source_id.as_str()),
            by_group: GroupBreakdown::from_key(results, |r| r.group_title.as_str()),
        }
    }
}
