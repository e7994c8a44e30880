//! Verdict extraction from free-text model output.
//!
//! Models are told to finish with `Resposta: Verdadeiro` or
//! `Resposta: Falso`, but they often reason in prose first and may name the
//! opposite word along the way. The parser takes the **last** whole-word
//! occurrence of either token, case-insensitively, and does not require the
//! `Resposta:` marker.
//!
//! A response that states the right verdict and then mentions the other
//! word afterwards is scored by the later word.

use crate::results::Verdict;
use regex::Regex;
use std::sync::OnceLock;

fn verdict_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(verdadeiro|falso)\b").expect("verdict pattern is a valid regex")
    })
}

/// Extract the verdict from the last token occurrence in `text`.
///
/// Returns `None` when neither token appears as a whole word.
///
/// # Example
///
/// ```
/// use healthbench_eval::{parse_label, Verdict};
///
/// assert_eq!(parse_label("blah blah Resposta: Falso"), Some(Verdict::False));
/// assert_eq!(parse_label("Verdadeiramente"), None);
/// ```
pub fn parse_label(text: &str) -> Option<Verdict> {
    let last = verdict_pattern().find_iter(text).last()?;
    if last.as_str().to_lowercase().starts_with('v') {
        Some(Verdict::True)
    } else {
        Some(Verdict::False)
    }
}

/// Parse `response` and compare against `expected`.
///
/// An unknown verdict is always incorrect.
pub fn score_response(response: &str, expected: Verdict) -> (Option<Verdict>, bool) {
    let predicted = parse_label(response);
    (predicted, predicted == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::final_line_false("blah blah Resposta: Falso", Some(Verdict::False))]
    #[case::last_occurrence_wins(
        "Verdadeiro, mas considerando... Resposta: Verdadeiro",
        Some(Verdict::True)
    )]
    #[case::opposite_mentioned_first("Não é verdadeiro.\nResposta: Falso", Some(Verdict::False))]
    #[case::second_guessing("Resposta: Verdadeiro\nHmm, talvez seja falso", Some(Verdict::False))]
    #[case::no_keyword("sem nenhuma palavra-chave", None)]
    #[case::empty("", None)]
    #[case::substring_only("Verdadeiramente", None)]
    #[case::plural_is_not_token("São falsos", None)]
    #[case::uppercase("RESPOSTA: VERDADEIRO", Some(Verdict::True))]
    #[case::lowercase("resposta: falso", Some(Verdict::False))]
    #[case::punctuation("(Falso).", Some(Verdict::False))]
    #[case::no_marker_needed("Verdadeiro", Some(Verdict::True))]
    fn test_parse_label(#[case] text: &str, #[case] expected: Option<Verdict>) {
        assert_eq!(parse_label(text), expected);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let text = "Falso? Não, Verdadeiro. Resposta: Falso";
        assert_eq!(parse_label(text), parse_label(text));
    }

    #[rstest]
    #[case("Resposta: Verdadeiro", Verdict::True, Some(Verdict::True), true)]
    #[case("Resposta: Verdadeiro", Verdict::False, Some(Verdict::True), false)]
    #[case("???", Verdict::True, None, false)]
    #[case("???", Verdict::False, None, false)]
    fn test_score_response(
        #[case] response: &str,
        #[case] expected: Verdict,
        #[case] predicted: Option<Verdict>,
        #[case] correct: bool,
    ) {
        assert_eq!(score_response(response, expected), (predicted, correct));
    }
}
