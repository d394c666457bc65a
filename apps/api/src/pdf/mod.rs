//! PDF text extraction behind a single capability trait.
//!
//! Two backends exist (`local` text-layer parsing and `llm` document reading);
//! exactly one is selected at startup from `PDF_EXTRACTOR`. Both return the
//! `NO_TEXT_SENTINEL` string when a readable document yields no text, so the
//! caller can fall back to manual entry instead of failing.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::config::PdfExtractorKind;
use crate::errors::AppError;
use crate::llm_client::{LanguageModel, LlmError};

pub mod handlers;
pub mod llm;
pub mod local;
pub mod prompts;

pub use llm::LlmPdfExtractor;
pub use local::LocalPdfExtractor;

/// Returned instead of an empty string when a document has no extractable text.
pub const NO_TEXT_SENTINEL: &str =
    "No text could be extracted from the PDF. Please enter text manually.";

/// What a client shows in place of text when the extraction call itself failed.
pub const EXTRACTION_FAILED_SENTINEL: &str =
    "PDF text extraction failed. Please enter job description manually.";

const PDF_MAGIC: &[u8] = b"%PDF-";

/// An uploaded PDF as received from a multipart form.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub filename: String,
    pub bytes: Bytes,
}

impl PdfUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("uploaded file is not a PDF")]
    NotPdf,

    #[error("failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF extraction timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("document model call failed: {0}")]
    Upstream(#[from] LlmError),
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::NotPdf => AppError::Validation(e.to_string()),
            ExtractError::Upstream(LlmError::MissingApiKey) => LlmError::MissingApiKey.into(),
            other => AppError::Extraction(other.to_string()),
        }
    }
}

/// Turns a PDF into plain text.
#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    async fn extract_text(&self, pdf: &PdfUpload) -> Result<String, ExtractError>;
}

/// Builds the configured extractor.
pub fn build_extractor(
    kind: PdfExtractorKind,
    llm: Arc<dyn LanguageModel>,
) -> Arc<dyn PdfTextExtractor> {
    match kind {
        PdfExtractorKind::Local => {
            info!("Using local PDF text extractor");
            Arc::new(LocalPdfExtractor)
        }
        PdfExtractorKind::Llm => {
            info!("Using LLM PDF text extractor");
            Arc::new(LlmPdfExtractor::new(llm))
        }
    }
}

/// True for either sentinel, or for blank text.
pub fn is_unusable_text(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == NO_TEXT_SENTINEL || text == EXTRACTION_FAILED_SENTINEL
}

fn ensure_pdf(pdf: &PdfUpload) -> Result<(), ExtractError> {
    if pdf.bytes.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(ExtractError::NotPdf)
    }
}

fn or_sentinel(text: String) -> String {
    if text.trim().is_empty() {
        NO_TEXT_SENTINEL.to_string()
    } else {
        text
    }
}
