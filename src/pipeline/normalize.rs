//! Report normalisation: raw model text → [`AnalysisReport`].
//!
//! The model is asked for JSON, but nothing guarantees it complies. When the
//! content does not parse as a JSON object the raw text is surfaced to the
//! caller (via [`ReviewError::ReportParse`]) instead of being discarded, so
//! integrators can see exactly what the model produced.
//!
//! By default the parsed object's keys are trusted as-is. Strict mode also
//! checks the three report fields and fails closed with
//! [`ReviewError::ReportMalformed`].

use crate::error::ReviewError;
use crate::report::{AnalysisReport, RiskLevel};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Metadata attached to every successful report.
#[derive(Debug, Clone)]
pub struct ReportMetadata<'a> {
    pub analysis_time: f64,
    pub model_used: &'a str,
    pub jurisdiction: &'a str,
}

/// Parse the model's content and attach metadata.
pub fn normalize(
    raw_content: &str,
    metadata: ReportMetadata<'_>,
    strict: bool,
) -> Result<AnalysisReport, ReviewError> {
    let mut findings = match serde_json::from_str::<Value>(raw_content) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            warn!("Model output is JSON but not an object ({})", kind(&other));
            return Err(ReviewError::ReportParse {
                raw: raw_content.to_string(),
            });
        }
        Err(e) => {
            warn!("Model output is not valid JSON: {}", e);
            return Err(ReviewError::ReportParse {
                raw: raw_content.to_string(),
            });
        }
    };

    if strict {
        validate_fields(&findings).map_err(|detail| ReviewError::ReportMalformed {
            detail,
            raw: raw_content.to_string(),
        })?;
    }

    // Metadata always wins over same-named keys from the model.
    for key in ["analysis_time", "model_used", "jurisdiction"] {
        if findings.remove(key).is_some() {
            debug!("Dropping model-supplied '{}' in favour of metadata", key);
        }
    }

    Ok(AnalysisReport {
        findings,
        analysis_time: round2(metadata.analysis_time),
        model_used: metadata.model_used.to_string(),
        jurisdiction: metadata.jurisdiction.to_string(),
    })
}

fn validate_fields(findings: &Map<String, Value>) -> Result<(), String> {
    for key in ["missing_clauses", "high_risk_terms"] {
        let ok = findings
            .get(key)
            .and_then(Value::as_array)
            .is_some_and(|items| items.iter().all(Value::is_string));
        if !ok {
            return Err(format!("'{key}' must be an array of strings"));
        }
    }

    let risk = findings.get("overall_risk").and_then(Value::as_str);
    match risk.map(str::parse::<RiskLevel>) {
        Some(Ok(_)) => Ok(()),
        _ => Err("'overall_risk' must be one of low, medium, high".to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Round to two decimal places.
pub fn round2(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ReportMetadata<'static> {
        ReportMetadata {
            analysis_time: 3.14159,
            model_used: "Qwen3-235B-A22B",
            jurisdiction: "Mainland China",
        }
    }

    const GOOD: &str = r#"{
        "missing_clauses": ["force majeure"],
        "high_risk_terms": ["Clause 9 waives all statutory remedies (Civil Code art. 506)"],
        "overall_risk": "high"
    }"#;

    #[test]
    fn valid_json_becomes_report_with_metadata() {
        let report = normalize(GOOD, meta(), false).unwrap();
        assert_eq!(report.missing_clauses(), vec!["force majeure"]);
        assert_eq!(report.overall_risk(), Some(RiskLevel::High));
        assert_eq!(report.analysis_time, 3.14);
        assert_eq!(report.model_used, "Qwen3-235B-A22B");
        assert_eq!(report.jurisdiction, "Mainland China");
    }

    #[test]
    fn not_json_surfaces_raw_content() {
        match normalize("not json", meta(), false) {
            Err(ReviewError::ReportParse { raw }) => assert_eq!(raw, "not json"),
            other => panic!("expected ReportParse, got {other:?}"),
        }
    }

    #[test]
    fn json_array_is_not_a_report() {
        assert!(matches!(
            normalize("[1, 2, 3]", meta(), false),
            Err(ReviewError::ReportParse { .. })
        ));
    }

    #[test]
    fn permissive_mode_passes_unexpected_keys_through() {
        let report = normalize(r#"{"verdict": "fine", "score": 7}"#, meta(), false).unwrap();
        assert_eq!(report.findings["verdict"], "fine");
        assert_eq!(report.findings["score"], 7);
        assert!(report.missing_clauses().is_empty());
    }

    #[test]
    fn metadata_overrides_model_keys() {
        let report = normalize(
            r#"{"overall_risk": "low", "model_used": "gpt-x", "jurisdiction": "Mars"}"#,
            meta(),
            false,
        )
        .unwrap();
        assert!(!report.findings.contains_key("model_used"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["model_used"], "Qwen3-235B-A22B");
        assert_eq!(json["jurisdiction"], "Mainland China");
    }

    #[test]
    fn strict_mode_accepts_well_formed_report() {
        assert!(normalize(GOOD, meta(), true).is_ok());
    }

    #[test]
    fn strict_mode_rejects_bad_shapes() {
        let cases = [
            r#"{"high_risk_terms": [], "overall_risk": "low"}"#,
            r#"{"missing_clauses": "none", "high_risk_terms": [], "overall_risk": "low"}"#,
            r#"{"missing_clauses": [], "high_risk_terms": [1], "overall_risk": "low"}"#,
            r#"{"missing_clauses": [], "high_risk_terms": [], "overall_risk": "extreme"}"#,
            r#"{"missing_clauses": [], "high_risk_terms": []}"#,
        ];
        for raw in cases {
            match normalize(raw, meta(), true) {
                Err(ReviewError::ReportMalformed { raw: r, .. }) => assert_eq!(r, raw),
                other => panic!("expected ReportMalformed for {raw}, got {other:?}"),
            }
        }
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(12.344), 12.34);
    }
}
