//! Pipeline stages for contract review.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own and swapped (the extractor and gateway sit behind traits).
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ (checklist + prompts) ──▶ gateway ──▶ normalize
//! (pdfium)                              (HTTP)      (JSON → report)
//! ```
//!
//! 1. [`extract`]: temp-file copy of the upload, pdfium parse on the
//!    blocking pool, text laid out by [`layout`]
//! 2. [`gateway`]: single chat-completion call with a hard timeout; the
//!    only stage with network I/O
//! 3. [`normalize`]: parse the model's JSON, attach metadata, surface raw
//!    output when parsing fails
//!
//! Checklist resolution and prompt building are pure functions and live in
//! [`crate::checklist`] and [`crate::prompts`].

pub mod extract;
pub mod gateway;
pub mod layout;
pub mod normalize;
