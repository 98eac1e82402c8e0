//! Tool-discovery and health descriptors.

use crate::config::ReviewConfig;
use serde_json::{json, Value};

pub const TOOL_LEGAL_REVIEW: &str = "legal_review";

pub const SERVICE_NAME: &str = "legal-guard";

/// The `/tools` listing: a single-element array describing `legal_review`.
pub fn list_tools(config: &ReviewConfig) -> Value {
    json!([{
        "name": TOOL_LEGAL_REVIEW,
        "description": format!(
            "Contract legal-risk review backed by the {} model",
            config.model_display_name
        ),
        "parameters": {
            "contract_file": {
                "type": "file",
                "description": "Contract to review, as a PDF upload"
            },
            "jurisdiction": {
                "type": "string",
                "description": "Jurisdiction whose law governs the review",
                "default": config.default_jurisdiction
            },
            "critical_clauses": {
                "type": "array",
                "description": "Custom clause checklist, replaces the defaults",
                "optional": true
            }
        }
    }])
}

/// The `/health` descriptor.
pub fn health(config: &ReviewConfig) -> Value {
    json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "model": config.model_display_name,
    })
}
