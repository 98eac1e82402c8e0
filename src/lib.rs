//! # legal-guard
//!
//! A remote-tool service that reviews contracts for legal risk. Upload a
//! PDF, and the service extracts its text, asks a hosted LLM to check it
//! against a clause checklist, and returns a normalised JSON report:
//! missing clauses, high-risk terms, and an overall risk level.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF upload
//!  │
//!  ├─ 1. Extract    temp-file copy → pdfium → tolerance-based text layout
//!  ├─ 2. Checklist  request override or the nine default clause categories
//!  ├─ 3. Prompt     jurisdiction-aware instruction + truncated contract text
//!  ├─ 4. Gateway    one chat-completion call, JSON response format, 30 s timeout
//!  └─ 5. Normalise  parse JSON, attach analysis_time / model_used / jurisdiction
//! ```
//!
//! Every failure becomes an [`ErrorEnvelope`]; a request always yields
//! exactly one [`ReviewOutcome`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use legal_guard::{review_contract, ContractSubmission, ReviewConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReviewConfig::builder()
//!         .api_key(std::env::var("LANYUN_API_KEY")?)
//!         .build()?;
//!     let bytes = std::fs::read("contract.pdf")?;
//!     let submission = ContractSubmission::new("contract.pdf", bytes);
//!     let outcome = review_contract(submission, config).await;
//!     println!("{}", serde_json::to_string_pretty(&outcome)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Serving
//!
//! [`server::router`] exposes the reviewer over HTTP (`/tools`, `/execute`,
//! `/health`). The `legal-guard` binary (feature `cli`, on by default)
//! wraps it with configuration from flags and environment variables.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod checklist;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod review;
pub mod server;
pub mod tools;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use checklist::{ClauseChecklist, ResolvedChecklist, DEFAULT_CLAUSES};
pub use config::{ReviewConfig, ReviewConfigBuilder};
pub use error::ReviewError;
pub use pipeline::extract::{PdfiumExtractor, TextExtractor};
pub use pipeline::gateway::{ChatCompletion, HttpGateway, ModelResponse};
pub use prompts::AnalysisPrompt;
pub use report::{
    AnalysisReport, ContractSubmission, ErrorEnvelope, ExtractedDocument, ReviewOutcome, RiskLevel,
    DEFAULT_JURISDICTION,
};
pub use review::{review_contract, ContractReviewer};
