//! Request and result types that flow through the review pipeline.
//!
//! A request enters as a [`ContractSubmission`] and leaves as exactly one
//! [`ReviewOutcome`]: either an [`AnalysisReport`] or an [`ErrorEnvelope`].
//! Both serialise to a plain JSON object; the envelope is the one with an
//! `error` key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Jurisdiction assumed when the caller does not name one.
pub const DEFAULT_JURISDICTION: &str = "Mainland China";

/// One uploaded contract plus its review options.
///
/// Lives for the duration of a single request. The bytes are written to a
/// temporary file during extraction and never persisted beyond that.
#[derive(Clone)]
pub struct ContractSubmission {
    pub file_bytes: Vec<u8>,
    pub file_name: String,
    pub jurisdiction: String,
    /// Replaces the default checklist when `Some` and non-empty.
    pub custom_clauses: Option<Vec<String>>,
}

impl ContractSubmission {
    pub fn new(file_name: impl Into<String>, file_bytes: Vec<u8>) -> Self {
        Self {
            file_bytes,
            file_name: file_name.into(),
            jurisdiction: DEFAULT_JURISDICTION.to_string(),
            custom_clauses: None,
        }
    }

    pub fn jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = jurisdiction.into();
        self
    }

    pub fn custom_clauses(mut self, clauses: Option<Vec<String>>) -> Self {
        self.custom_clauses = clauses;
        self
    }
}

impl fmt::Debug for ContractSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractSubmission")
            .field("file_name", &self.file_name)
            .field("file_bytes", &format_args!("<{} bytes>", self.file_bytes.len()))
            .field("jurisdiction", &self.jurisdiction)
            .field("custom_clauses", &self.custom_clauses)
            .finish()
    }
}

/// Plain text pulled out of a PDF, pages joined in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub text: String,
    /// Total pages in the document, including pages that yielded no text.
    pub page_count: usize,
}

/// Overall risk rating requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level '{other}'")),
        }
    }
}

/// A successful review.
///
/// `findings` holds whatever JSON object the model produced, verbatim
/// (normally `missing_clauses`, `high_risk_terms` and `overall_risk`). The
/// three metadata fields are attached by the normaliser and always win over
/// same-named keys from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub findings: Map<String, Value>,
    /// Seconds from request receipt to normalisation, two decimals.
    pub analysis_time: f64,
    pub model_used: String,
    pub jurisdiction: String,
}

impl AnalysisReport {
    pub fn missing_clauses(&self) -> Vec<&str> {
        self.string_list("missing_clauses")
    }

    pub fn high_risk_terms(&self) -> Vec<&str> {
        self.string_list("high_risk_terms")
    }

    /// `None` when the model omitted the field or used an unknown value.
    pub fn overall_risk(&self) -> Option<RiskLevel> {
        self.findings
            .get("overall_risk")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    fn string_list(&self, key: &str) -> Vec<&str> {
        self.findings
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// A failed review. Returned with the same transport status as a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_time: Option<f64>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            raw_response: None,
            analysis_time: None,
        }
    }
}

/// Terminal state of one review: exactly one of report or error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReviewOutcome {
    Report(AnalysisReport),
    Error(ErrorEnvelope),
}

impl ReviewOutcome {
    pub fn is_report(&self) -> bool {
        matches!(self, ReviewOutcome::Report(_))
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            ReviewOutcome::Report(r) => Some(r),
            ReviewOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorEnvelope> {
        match self {
            ReviewOutcome::Report(_) => None,
            ReviewOutcome::Error(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_report() -> AnalysisReport {
        let findings = json!({
            "missing_clauses": ["force majeure", "notice delivery"],
            "high_risk_terms": ["Unlimited liability in clause 7"],
            "overall_risk": "High",
        });
        AnalysisReport {
            findings: findings.as_object().cloned().unwrap(),
            analysis_time: 2.5,
            model_used: "Qwen3-235B-A22B".into(),
            jurisdiction: DEFAULT_JURISDICTION.into(),
        }
    }

    #[test]
    fn report_serialises_flat() {
        let value = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(value["missing_clauses"][1], "notice delivery");
        assert_eq!(value["analysis_time"], 2.5);
        assert_eq!(value["model_used"], "Qwen3-235B-A22B");
        assert!(value.get("findings").is_none());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn report_accessors() {
        let report = sample_report();
        assert_eq!(report.missing_clauses(), vec!["force majeure", "notice delivery"]);
        assert_eq!(report.high_risk_terms().len(), 1);
        assert_eq!(report.overall_risk(), Some(RiskLevel::High));
    }

    #[test]
    fn envelope_skips_absent_fields() {
        let value = serde_json::to_value(ReviewOutcome::Error(ErrorEnvelope::new("boom"))).unwrap();
        assert_eq!(value, json!({ "error": "boom" }));
    }

    #[test]
    fn risk_level_parse_is_case_insensitive() {
        assert_eq!("MEDIUM".parse::<RiskLevel>(), Ok(RiskLevel::Medium));
        assert_eq!(" low ".parse::<RiskLevel>(), Ok(RiskLevel::Low));
        assert!("severe".parse::<RiskLevel>().is_err());
    }

    #[test]
    fn submission_debug_hides_bytes() {
        let s = ContractSubmission::new("nda.pdf", vec![0u8; 2048]);
        let dbg = format!("{s:?}");
        assert!(dbg.contains("<2048 bytes>"));
        assert_eq!(s.jurisdiction, DEFAULT_JURISDICTION);
    }
}
