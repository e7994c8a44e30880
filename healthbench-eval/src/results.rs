//! Question and result types.
//!
//! Field names serialize to the Portuguese keys used by the benchmark's
//! dataset and report files (`arquivo`, `titulo`, `pergunta`, ...).

use crate::parser::score_response;
use serde::{Deserialize, Serialize};

/// Prefix written into `raw_response` when the provider call failed.
pub const CALL_ERROR_MARKER: &str = "[ERRO NA CHAMADA]";

/// A true/false verdict, serialized as the exact tokens the model must echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// "Verdadeiro"
    #[serde(rename = "Verdadeiro")]
    True,
    /// "Falso"
    #[serde(rename = "Falso")]
    False,
}

impl Verdict {
    /// The localized token for this verdict.
    pub const fn token(self) -> &'static str {
        match self {
            Verdict::True => "Verdadeiro",
            Verdict::False => "Falso",
        }
    }

    /// Expected verdict for a question at `offset` within its pair.
    pub const fn for_pair_offset(offset: usize) -> Self {
        if offset % 2 == 0 {
            Verdict::True
        } else {
            Verdict::False
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// A single labeled question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    /// Identifier of the originating block
    #[serde(rename = "arquivo")]
    pub source_id: String,

    /// Grouping label of the originating block
    #[serde(rename = "titulo")]
    pub group_title: String,

    /// The question text sent to the model
    #[serde(rename = "pergunta")]
    pub question: String,

    /// The verdict assigned by the pairing contract
    #[serde(rename = "esperado")]
    pub expected: Verdict,

    /// Position within the block's question list
    #[serde(rename = "idx_local")]
    pub local_index: usize,
}

/// How an item's evaluation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The response carried a verdict token
    Labeled(Verdict),
    /// The response carried no verdict token
    UnknownParse,
    /// The provider call failed
    CallFailed,
}

/// Outcome of evaluating one [`QuestionItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Identifier of the originating block
    #[serde(rename = "arquivo")]
    pub source_id: String,

    /// Grouping label of the originating block
    #[serde(rename = "titulo")]
    pub group_title: String,

    /// Position within the block's question list
    #[serde(rename = "idx_local")]
    pub local_index: usize,

    /// The question that was asked
    #[serde(rename = "pergunta")]
    pub question: String,

    /// Expected verdict
    #[serde(rename = "esperado")]
    pub expected: Verdict,

    /// Parsed verdict (`None` when unknown)
    #[serde(rename = "pred")]
    pub predicted: Option<Verdict>,

    /// Whether the parsed verdict matches the expected one
    #[serde(rename = "correta")]
    pub is_correct: bool,

    /// Provider response, or the call-error marker and message
    #[serde(rename = "resposta_bruta")]
    pub raw_response: String,

    /// Whether the provider call failed (not part of the report schema)
    #[serde(skip)]
    pub call_failed: bool,
}

impl EvaluationResult {
    /// Create a result from a provider response, parsing its verdict.
    pub fn answered(item: &QuestionItem, response: String) -> Self {
        let (predicted, is_correct) = score_response(&response, item.expected);
        Self {
            source_id: item.source_id.clone(),
            group_title: item.group_title.clone(),
            local_index: item.local_index,
            question: item.question.clone(),
            expected: item.expected,
            predicted,
            is_correct,
            raw_response: response,
            call_failed: false,
        }
    }

    /// Create an unknown, incorrect result for a failed provider call.
    pub fn failed_call(item: &QuestionItem, error: &dyn std::fmt::Display) -> Self {
        Self {
            source_id: item.source_id.clone(),
            group_title: item.group_title.clone(),
            local_index: item.local_index,
            question: item.question.clone(),
            expected: item.expected,
            predicted: None,
            is_correct: false,
            raw_response: format!("{}: {}", CALL_ERROR_MARKER, error),
            call_failed: true,
        }
    }

    /// Whether no verdict could be determined.
    pub fn is_unknown(&self) -> bool {
        self.predicted.is_none()
    }

    /// Final state of this item.
    pub fn outcome(&self) -> ItemOutcome {
        match (self.call_failed, self.predicted) {
            (true, _) => ItemOutcome::CallFailed,
            (false, Some(verdict)) => ItemOutcome::Labeled(verdict),
            (false, None) => ItemOutcome::UnknownParse,
        }
    }

    /// Flatten into a CSV record in report column order.
    ///
    /// Question newlines collapse to spaces; response newlines become a
    /// literal `\n` so each result stays on one line.
    pub fn csv_record(&self) -> [String; 8] {
        [
            self.source_id.clone(),
            self.group_title.clone(),
            self.local_index.to_string(),
            self.question.replace('\n', " ").trim().to_string(),
            self.expected.token().to_string(),
            self.predicted.map(|v| v.token().to_string()).unwrap_or_default(),
            if self.is_correct { "1" } else { "0" }.to_string(),
            self.raw_response.replace('\n', "\\n"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(expected: Verdict) -> QuestionItem {
        QuestionItem {
            source_id: "doc1".to_string(),
            group_title: "Cardio".to_string(),
            question: "A hipertensão é\nfator de risco?".to_string(),
            expected,
            local_index: 0,
        }
    }

    #[test]
    fn test_verdict_tokens() {
        assert_eq!(Verdict::True.token(), "Verdadeiro");
        assert_eq!(Verdict::False.to_string(), "Falso");
        assert_eq!(Verdict::for_pair_offset(0), Verdict::True);
        assert_eq!(Verdict::for_pair_offset(1), Verdict::False);
        assert_eq!(Verdict::for_pair_offset(4), Verdict::True);
    }

    #[test]
    fn test_answered_correct() {
        let result =
            EvaluationResult::answered(&item(Verdict::True), "Resposta: Verdadeiro".into());
        assert_eq!(result.predicted, Some(Verdict::True));
        assert!(result.is_correct);
        assert_eq!(result.outcome(), ItemOutcome::Labeled(Verdict::True));
    }

    #[test]
    fn test_answered_without_token_is_unknown() {
        let result = EvaluationResult::answered(&item(Verdict::False), "Não sei.".into());
        assert!(result.is_unknown());
        assert!(!result.is_correct);
        assert_eq!(result.outcome(), ItemOutcome::UnknownParse);
    }

    #[test]
    fn test_failed_call_carries_marker() {
        let result = EvaluationResult::failed_call(&item(Verdict::True), &"connection reset");
        assert!(result.is_unknown());
        assert!(!result.is_correct);
        assert_eq!(result.raw_response, "[ERRO NA CHAMADA]: connection reset");
        assert_eq!(result.outcome(), ItemOutcome::CallFailed);
    }

    #[test]
    fn test_csv_record_normalizes_newlines() {
        let result = EvaluationResult::answered(
            &item(Verdict::True),
            "Pensando...\nResposta: Falso".into(),
        );
        let record = result.csv_record();

        assert_eq!(record[3], "A hipertensão é fator de risco?");
        assert_eq!(record[4], "Verdadeiro");
        assert_eq!(record[5], "Falso");
        assert_eq!(record[6], "0");
        assert_eq!(record[7], "Pensando...\\nResposta: Falso");
    }

    #[test]
    fn test_csv_record_unknown_pred_is_empty() {
        let result = EvaluationResult::failed_call(&item(Verdict::False), &"timeout");
        assert_eq!(result.csv_record()[5], "");
    }

    #[test]
    fn test_json_uses_report_keys() {
        let result = EvaluationResult::failed_call(&item(Verdict::False), &"timeout");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["arquivo"], "doc1");
        assert_eq!(json["esperado"], "Falso");
        assert!(json["pred"].is_null());
        assert_eq!(json["correta"], false);
        assert!(json.get("call_failed").is_none());
    }
}
