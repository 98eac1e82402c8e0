//! Review orchestration: one contract in, one outcome out.
//!
//! The pipeline is strictly linear:
//!
//! ```text
//! Received → Extracting → ChecklistResolved → PromptBuilt → Calling → Normalizing → Done
//!               │                                              │           │
//!               └──────────────────── Errored ◀────────────────┴───────────┘
//! ```
//!
//! Every failure short-circuits the remaining stages and becomes an
//! [`ErrorEnvelope`] right where it happened. No stage is retried and no two
//! stages of one request run at the same time.

use crate::checklist::ClauseChecklist;
use crate::config::ReviewConfig;
use crate::error::ReviewError;
use crate::pipeline::extract::{ensure_text, PdfiumExtractor, TextExtractor};
use crate::pipeline::gateway::{ChatCompletion, HttpGateway};
use crate::pipeline::normalize::{self, round2, ReportMetadata};
use crate::prompts::build_prompt;
use crate::report::{AnalysisReport, ContractSubmission, ErrorEnvelope, ReviewOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Shared, read-only reviewer: configuration plus resolved extractor and
/// gateway. Cheap to clone; safe to use from many requests at once.
#[derive(Clone)]
pub struct ContractReviewer {
    config: Arc<ReviewConfig>,
    extractor: Arc<dyn TextExtractor>,
    gateway: Arc<dyn ChatCompletion>,
}

impl ContractReviewer {
    /// Build a reviewer, resolving components from most- to least-specific.
    ///
    /// 1. **Pre-built components** (`config.extractor`, `config.gateway`) are
    ///    used as-is. This is how tests inject fakes.
    /// 2. Otherwise the pdfium extractor and the HTTP gateway are constructed
    ///    from the config, the gateway taking its credential from
    ///    `config.api_key`.
    pub fn new(config: ReviewConfig) -> Result<Self, ReviewError> {
        let extractor: Arc<dyn TextExtractor> = match config.extractor {
            Some(ref e) => Arc::clone(e),
            None => Arc::new(PdfiumExtractor::from_config(&config)),
        };
        let gateway: Arc<dyn ChatCompletion> = match config.gateway {
            Some(ref g) => Arc::clone(g),
            None => Arc::new(HttpGateway::from_config(&config)?),
        };

        Ok(Self {
            config: Arc::new(config),
            extractor,
            gateway,
        })
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Run the full pipeline for one submission.
    ///
    /// Never fails: every error is folded into [`ReviewOutcome::Error`].
    pub async fn review(&self, submission: ContractSubmission) -> ReviewOutcome {
        let start = Instant::now();
        info!(
            "Reviewing '{}' ({} bytes, jurisdiction: {})",
            submission.file_name,
            submission.file_bytes.len(),
            submission.jurisdiction
        );

        match self.run(&submission, start).await {
            Ok(report) => {
                info!(
                    "Review complete in {:.2}s: {} missing clauses, risk {}",
                    report.analysis_time,
                    report.missing_clauses().len(),
                    report
                        .overall_risk()
                        .map(|r| r.as_str())
                        .unwrap_or("unknown")
                );
                ReviewOutcome::Report(report)
            }
            Err(e) => {
                warn!("Review of '{}' failed: {}", submission.file_name, e);
                ReviewOutcome::Error(e.into_envelope(round2(start.elapsed().as_secs_f64())))
            }
        }
    }

    async fn run(
        &self,
        submission: &ContractSubmission,
        start: Instant,
    ) -> Result<AnalysisReport, ReviewError> {
        // ── Stage 1: Extract text ────────────────────────────────────────
        let document = self.extractor.extract(&submission.file_bytes).await?;
        let document = ensure_text(document)?;
        debug!(
            "Extracted {} chars from {} pages",
            document.text.chars().count(),
            document.page_count
        );

        // ── Stage 2: Resolve checklist ───────────────────────────────────
        let resolved = ClauseChecklist::resolve(submission.custom_clauses.as_deref());
        if resolved.used_default {
            debug!("Using default checklist ({} clauses)", resolved.checklist.len());
        } else {
            debug!("Using custom checklist ({} clauses)", resolved.checklist.len());
        }

        // ── Stage 3: Build prompt ────────────────────────────────────────
        let chars = document.text.chars().count();
        if chars > self.config.max_document_chars {
            debug!(
                "Truncating contract text from {} to {} chars",
                chars, self.config.max_document_chars
            );
        }
        let prompt = build_prompt(
            &document,
            &resolved.checklist,
            &submission.jurisdiction,
            self.config.max_document_chars,
        );

        // ── Stage 4: Call the model ──────────────────────────────────────
        let response = self.gateway.complete(&prompt).await?;
        debug!("Model call took {:.2}s", response.elapsed_secs);

        // ── Stage 5: Normalise ───────────────────────────────────────────
        normalize::normalize(
            &response.raw_content,
            ReportMetadata {
                analysis_time: start.elapsed().as_secs_f64(),
                model_used: &self.config.model_display_name,
                jurisdiction: &submission.jurisdiction,
            },
            self.config.strict_report,
        )
    }
}

/// Review a single contract with a one-off reviewer.
///
/// Convenience for scripts and the CLI; long-running services should build
/// one [`ContractReviewer`] and share it.
pub async fn review_contract(
    submission: ContractSubmission,
    config: ReviewConfig,
) -> ReviewOutcome {
    match ContractReviewer::new(config) {
        Ok(reviewer) => reviewer.review(submission).await,
        Err(e) => ReviewOutcome::Error(ErrorEnvelope::new(e.to_string())),
    }
}
