//! PDF text extraction via pdfium.
//!
//! ## Temp files
//!
//! The upload arrives as bytes, but extraction works on an on-disk copy.
//! Each request gets a uniquely named [`tempfile::NamedTempFile`], never a
//! name derived from the uploaded file name, so two concurrent uploads of
//! `contract.pdf` cannot collide. The copy is removed when the handle drops,
//! which happens on every exit path: success, PDF error, or panic inside
//! the blocking task.
//!
//! ## Threading
//!
//! pdfium is a C++ library with CPU-bound parsing. All pdfium work runs on
//! Tokio's blocking pool via `spawn_blocking`.

use crate::config::ReviewConfig;
use crate::error::ReviewError;
use crate::pipeline::layout::{layout_page, Glyph, LayoutTolerance};
use crate::report::ExtractedDocument;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Turns PDF bytes into text.
///
/// Implementations must not leave anything on disk once `extract` returns.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, file_bytes: &[u8]) -> Result<ExtractedDocument, ReviewError>;
}

/// The production extractor backed by pdfium-render.
#[derive(Debug, Clone)]
pub struct PdfiumExtractor {
    temp_dir: Option<PathBuf>,
    library_dir: Option<PathBuf>,
    tolerance: LayoutTolerance,
}

impl PdfiumExtractor {
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self {
            temp_dir: config.temp_dir.clone(),
            library_dir: config.pdfium_library_dir.clone(),
            tolerance: LayoutTolerance {
                x: config.x_tolerance,
                y: config.y_tolerance,
            },
        }
    }
}

#[async_trait]
impl TextExtractor for PdfiumExtractor {
    async fn extract(&self, file_bytes: &[u8]) -> Result<ExtractedDocument, ReviewError> {
        let bytes = file_bytes.to_vec();
        let this = self.clone();

        tokio::task::spawn_blocking(move || this.extract_blocking(&bytes))
            .await
            .map_err(|e| ReviewError::FileProcessing {
                detail: format!("extraction task panicked: {e}"),
            })?
    }
}

impl PdfiumExtractor {
    /// Write the upload to a fresh temp file, extract, and let the temp file
    /// drop before returning.
    fn extract_blocking(&self, bytes: &[u8]) -> Result<ExtractedDocument, ReviewError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("contract-").suffix(".pdf");
        let mut tmp = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| file_error("failed to create temp file", e))?;

        tmp.write_all(bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| file_error("failed to write temp file", e))?;
        debug!("Wrote {} bytes to {}", bytes.len(), tmp.path().display());

        let result = self.extract_from_path(tmp.path());

        if let Err(e) = tmp.close() {
            warn!("Failed to remove temp file: {}", e);
        }
        result
    }

    fn extract_from_path(&self, path: &Path) -> Result<ExtractedDocument, ReviewError> {
        let pdfium = bind_pdfium(self.library_dir.as_deref())?;

        let document = pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| ReviewError::FileProcessing {
                detail: format!("cannot open PDF: {e:?}"),
            })?;

        let pages = document.pages();
        let page_count = pages.len() as usize;

        let page_texts = pages.iter().enumerate().map(|(idx, page)| {
            let page_text = match page.text() {
                Ok(t) => t,
                Err(e) => {
                    debug!("Page {}: no text layer ({:?})", idx + 1, e);
                    return String::new();
                }
            };

            let glyphs: Vec<Glyph> = page_text
                .chars()
                .iter()
                .filter_map(|c| {
                    let ch = c.unicode_char()?;
                    let bounds = c.loose_bounds().ok()?;
                    Some(Glyph {
                        ch,
                        left: bounds.left().value,
                        right: bounds.right().value,
                        top: bounds.top().value,
                        bottom: bounds.bottom().value,
                    })
                })
                .collect();

            layout_page(&glyphs, self.tolerance)
        });
        let text = join_pages(page_texts);

        info!("Extracted {} chars from {} pages", text.chars().count(), page_count);
        Ok(ExtractedDocument { text, page_count })
    }
}

/// Concatenate per-page text in document order.
///
/// Pages whose text is blank are dropped; every kept page is followed by a
/// single `\n`.
pub fn join_pages(pages: impl IntoIterator<Item = String>) -> String {
    let mut text = String::new();
    for (idx, page) in pages.into_iter().enumerate() {
        if page.trim().is_empty() {
            debug!("Page {}: no extractable text, skipped", idx + 1);
            continue;
        }
        text.push_str(&page);
        text.push('\n');
    }
    text
}

/// Bind to the pdfium shared library: explicit directory first, then the
/// working directory, then the system library path.
fn bind_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, ReviewError> {
    let bindings = match library_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ReviewError::FileProcessing {
        detail: format!("pdfium library unavailable: {e:?}"),
    })?;

    Ok(Pdfium::new(bindings))
}

fn file_error(context: &str, e: std::io::Error) -> ReviewError {
    ReviewError::FileProcessing {
        detail: format!("{context}: {e}"),
    }
}

/// Reject a document whose pages produced no text at all.
pub fn ensure_text(document: ExtractedDocument) -> Result<ExtractedDocument, ReviewError> {
    if document.text.trim().is_empty() {
        Err(ReviewError::NoTextExtracted)
    } else {
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor_in(dir: &Path) -> PdfiumExtractor {
        let config = ReviewConfig::builder().temp_dir(dir).build().unwrap();
        PdfiumExtractor::from_config(&config)
    }

    #[tokio::test]
    async fn garbage_bytes_fail_and_leave_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = extractor_in(dir.path());

        let result = extractor.extract(b"definitely not a pdf").await;

        assert!(matches!(result, Err(ReviewError::FileProcessing { .. })));
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 0, "temp copy must be removed on failure");
    }

    #[tokio::test]
    async fn missing_temp_dir_is_a_file_processing_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        let extractor = extractor_in(&gone);

        let result = extractor.extract(b"%PDF-1.4").await;
        assert!(matches!(result, Err(ReviewError::FileProcessing { .. })));
    }

    #[test]
    fn pages_are_joined_in_document_order() {
        let pages = (1..=5).map(|n| format!("Article {n}"));
        let text = join_pages(pages);

        assert_eq!(text, "Article 1\nArticle 2\nArticle 3\nArticle 4\nArticle 5\n");
        let positions: Vec<usize> = (1..=5)
            .map(|n| text.find(&format!("Article {n}")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn blank_pages_contribute_nothing() {
        let pages = vec![
            String::new(),
            "Party A".to_string(),
            "  \n\t".to_string(),
            "Party B".to_string(),
            String::new(),
        ];
        assert_eq!(join_pages(pages), "Party A\nParty B\n");
    }

    #[test]
    fn all_blank_pages_are_no_text_extracted() {
        let pages = vec![String::new(), " ".to_string(), "\n".to_string()];
        let doc = ExtractedDocument {
            text: join_pages(pages),
            page_count: 3,
        };
        assert_eq!(doc.text, "");
        assert!(matches!(ensure_text(doc), Err(ReviewError::NoTextExtracted)));
    }

    #[test]
    fn ensure_text_rejects_blank_documents() {
        let blank = ExtractedDocument {
            text: "\n\n  \n".into(),
            page_count: 3,
        };
        assert!(matches!(ensure_text(blank), Err(ReviewError::NoTextExtracted)));

        let ok = ExtractedDocument {
            text: "Article 1\n".into(),
            page_count: 1,
        };
        assert_eq!(ensure_text(ok.clone()).unwrap(), ok);
    }
}
