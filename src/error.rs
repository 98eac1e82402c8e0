//! Error types for the legal-guard library.
//!
//! Every stage of the review pipeline reports failure through
//! [`ReviewError`]. None of these errors ever reach the HTTP layer as a
//! fault: the orchestrator converts each one into an
//! [`ErrorEnvelope`](crate::report::ErrorEnvelope) at the stage where it
//! happened, and callers tell success from failure by the presence of an
//! `error` key rather than by status code.
//!
//! Checklist problems are deliberately absent from this taxonomy. A bad
//! `critical_clauses` override silently degrades to the default list
//! (see [`crate::checklist`]).

use crate::report::ErrorEnvelope;
use thiserror::Error;

/// All failures the review pipeline can terminate with.
#[derive(Debug, Error)]
pub enum ReviewError {
    // ── Extraction errors ─────────────────────────────────────────────────
    /// The upload could not be written to disk, or the PDF engine could not
    /// open or read it.
    #[error("File processing failed: {detail}")]
    FileProcessing { detail: String },

    /// The PDF opened fine but no page produced any text (scanned images,
    /// empty document).
    #[error("No extractable text found in the document")]
    NoTextExtracted,

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The model call did not complete within the configured timeout.
    #[error("Upstream model request timed out after {secs}s")]
    UpstreamTimeout { secs: u64 },

    /// The upstream answered, but without a `choices[0].message.content` string.
    #[error("Upstream model returned an invalid response: {detail}")]
    UpstreamMalformed { detail: String },

    /// Any other transport or protocol failure (connection refused, TLS,
    /// non-2xx status).
    #[error("Upstream model error: {message}")]
    UpstreamError { message: String },

    // ── Report errors ─────────────────────────────────────────────────────
    /// The model's content is not a JSON object.
    #[error("Failed to parse model output as JSON")]
    ReportParse { raw: String },

    /// Strict mode only: the JSON object lacks the expected report fields.
    #[error("Model output is missing required report fields: {detail}")]
    ReportMalformed { detail: String, raw: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ReviewError {
    /// Convert into the wire envelope returned to the caller.
    ///
    /// Report errors carry the raw model output and the elapsed time so the
    /// caller can see what the model actually produced. All other errors
    /// carry only the message.
    pub fn into_envelope(self, analysis_time: f64) -> ErrorEnvelope {
        let error = self.to_string();
        match self {
            ReviewError::ReportParse { raw } | ReviewError::ReportMalformed { raw, .. } => {
                ErrorEnvelope {
                    error,
                    raw_response: Some(raw),
                    analysis_time: Some(analysis_time),
                }
            }
            _ => ErrorEnvelope::new(error),
        }
    }
}
