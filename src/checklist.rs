//! The clause checklist a contract is checked against for omissions.
//!
//! Callers may replace the built-in list through the `critical_clauses` key
//! of the tool's `parameters` JSON. The override is all-or-nothing: a valid
//! non-empty list of strings replaces the defaults verbatim, anything else
//! (bad JSON, wrong type, empty list, missing key) falls back to the
//! defaults without failing the request.

use serde_json::Value;
use tracing::debug;

/// The built-in clause categories, in prompt order.
pub const DEFAULT_CLAUSES: [&str; 9] = [
    "force majeure",
    "dispute resolution",
    "confidentiality",
    "breach liability",
    "intellectual property",
    "termination",
    "payment terms",
    "governing law",
    "notice delivery",
];

/// Key inside the `parameters` object that carries the override.
pub const CRITICAL_CLAUSES_KEY: &str = "critical_clauses";

/// An ordered list of clause labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseChecklist {
    clauses: Vec<String>,
}

/// Result of checklist resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChecklist {
    pub checklist: ClauseChecklist,
    /// True when the default list was used, either because no override was
    /// supplied or because it was unusable.
    pub used_default: bool,
}

impl Default for ClauseChecklist {
    fn default() -> Self {
        Self {
            clauses: DEFAULT_CLAUSES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl ClauseChecklist {
    /// Resolve the effective checklist from an optional override. Never fails.
    pub fn resolve(custom: Option<&[String]>) -> ResolvedChecklist {
        match custom {
            Some(list) if !list.is_empty() => ResolvedChecklist {
                checklist: ClauseChecklist {
                    clauses: list.to_vec(),
                },
                used_default: false,
            },
            _ => ResolvedChecklist {
                checklist: ClauseChecklist::default(),
                used_default: true,
            },
        }
    }

    /// Resolve straight from the raw `parameters` JSON string.
    pub fn resolve_parameters(parameters: &str) -> ResolvedChecklist {
        let custom = parse_custom_clauses(parameters);
        Self::resolve(custom.as_deref())
    }

    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Comma-separated labels as embedded in the prompt.
    pub fn joined(&self) -> String {
        self.clauses.join(", ")
    }
}

/// Pull `critical_clauses` out of the tool's `parameters` JSON.
///
/// Returns `None` for anything that is not an object holding a non-empty
/// array of strings under that key.
pub fn parse_custom_clauses(parameters: &str) -> Option<Vec<String>> {
    let value: Value = match serde_json::from_str(parameters) {
        Ok(v) => v,
        Err(e) => {
            debug!("parameters is not valid JSON, using default checklist: {}", e);
            return None;
        }
    };

    let items = value.as_object()?.get(CRITICAL_CLAUSES_KEY)?.as_array()?;

    let clauses = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>();

    match clauses {
        Some(list) if !list.is_empty() => Some(list),
        _ => {
            debug!("critical_clauses is empty or not a list of strings, ignoring");
            None
        }
    }
}
