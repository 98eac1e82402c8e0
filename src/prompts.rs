//! Prompt construction for the upstream legal-analysis model.
//!
//! All prompt wording lives here so it can be inspected and regression
//! tested without a live model. [`build_prompt`] is a pure function: the
//! same document, checklist and jurisdiction always produce the same
//! [`AnalysisPrompt`].

use crate::checklist::ClauseChecklist;
use crate::report::ExtractedDocument;

/// The two messages sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    pub system_instruction: String,
    pub user_content: String,
}

/// The system instruction for one review.
///
/// Caller-supplied values are interpolated exactly once, so text inside
/// `jurisdiction` or a clause label is never itself treated as a placeholder.
fn system_instruction(jurisdiction: &str, clauses: &str) -> String {
    format!(
        r#"You are a senior lawyer qualified in {jurisdiction} law, expert at identifying legal risks and missing clauses in contracts. Use rigorous legal language and cite specific statutory provisions.

Review the contract supplied by the user and reply with ONLY a JSON object of exactly this shape:
{{
  "missing_clauses": ["critical clauses the contract lacks, checked against: {clauses}"],
  "high_risk_terms": ["description of each high-risk term and its legal basis"],
  "overall_risk": "low | medium | high"
}}

Requirements:
- When citing a legal provision, name its source (statute and article).
- Distinguish mandatory clauses from advisory ones.
- Assess the practical legal consequences of each missing clause.
- "overall_risk" must be exactly one of "low", "medium" or "high".
- Output nothing outside the JSON object."#
    )
}

/// Build the prompt for one review.
///
/// The document text is cut to `max_chars` characters before embedding.
/// Truncation is silent; the model simply sees the first part of the
/// contract.
pub fn build_prompt(
    document: &ExtractedDocument,
    checklist: &ClauseChecklist,
    jurisdiction: &str,
    max_chars: usize,
) -> AnalysisPrompt {
    let system_instruction = system_instruction(jurisdiction, &checklist.joined());

    let text = truncate_chars(&document.text, max_chars);
    let user_content = format!(
        "Contract text:\n\"\"\"\n{}\n\"\"\"\nAnalyse the contract and output the JSON report.",
        text
    );

    AnalysisPrompt {
        system_instruction,
        user_content,
    }
}

/// Return at most `max_chars` characters of `text`, never splitting a
/// multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
