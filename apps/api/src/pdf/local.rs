use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use async_trait::async_trait;
use pdf_extract::{Document, PlainTextOutput};
use tracing::{debug, info, warn};

use super::{ensure_pdf, ExtractError, PdfTextExtractor, PdfUpload, NO_TEXT_SENTINEL};

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Text-layer extraction with pdf-extract. Scanned documents come back as the
/// no-text sentinel.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPdfExtractor;

/// Text of one page, or why that page could not be read.
type PageText = Result<String, String>;

#[async_trait]
impl PdfTextExtractor for LocalPdfExtractor {
    #[tracing::instrument(skip(self, pdf), fields(filename = %pdf.filename, bytes = pdf.bytes.len()))]
    async fn extract_text(&self, pdf: &PdfUpload) -> Result<String, ExtractError> {
        ensure_pdf(pdf)?;

        let bytes = pdf.bytes.clone();
        let pages = run_blocking(EXTRACTION_TIMEOUT, move || read_pages(&bytes)).await?;
        info!(page_count = pages.len(), "PDF text extraction complete");

        Ok(assemble_pages(pages))
    }
}

/// Runs a parser job on the blocking pool, giving up after `limit`.
async fn run_blocking<T, F>(limit: Duration, job: F) -> Result<T, ExtractError>
where
    F: FnOnce() -> Result<T, ExtractError> + Send + 'static,
    T: Send + 'static,
{
    tokio::time::timeout(limit, tokio::task::spawn_blocking(job))
        .await
        .map_err(|_| ExtractError::Timeout(limit))?
        .map_err(|e| ExtractError::Parse(format!("extraction task failed: {e}")))?
}

/// Opens the document once, then reads every page on its own. A document that
/// cannot be opened is an error; a page that cannot be read is not.
fn read_pages(bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    let mut doc = match catch_unwind(|| Document::load_mem(bytes)) {
        Ok(Ok(doc)) => doc,
        Ok(Err(e)) => return Err(ExtractError::Parse(e.to_string())),
        Err(_) => {
            return Err(ExtractError::Parse(
                "PDF parser aborted on malformed input".to_string(),
            ))
        }
    };
    // Owner-password-only documents open with the empty user password.
    if doc.is_encrypted() {
        doc.decrypt("")
            .map_err(|e| ExtractError::Parse(format!("encrypted PDF: {e}")))?;
    }

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    Ok(page_numbers
        .into_iter()
        .map(|page_num| read_page(&doc, page_num))
        .collect())
}

/// pdf-extract panics on some malformed fonts and content streams, so each
/// page is isolated.
fn read_page(doc: &Document, page_num: u32) -> PageText {
    let mut text = String::new();
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut output = PlainTextOutput::new(&mut text);
        pdf_extract::output_doc_page(doc, &mut output, page_num)
    }));

    match outcome {
        Ok(Ok(())) => Ok(text),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("parser aborted on malformed page content".to_string()),
    }
}

/// Joins non-blank pages with newlines. Failed pages are logged and skipped.
fn assemble_pages(pages: Vec<PageText>) -> String {
    let mut texts = Vec::with_capacity(pages.len());

    for (index, page) in pages.into_iter().enumerate() {
        let page_number = index + 1;
        match page {
            Ok(text) if !text.trim().is_empty() => texts.push(text.trim().to_string()),
            Ok(_) => debug!("Page {page_number} has no text layer"),
            Err(e) => warn!("Skipping page {page_number}: {e}"),
        }
    }

    if texts.is_empty() {
        NO_TEXT_SENTINEL.to_string()
    } else {
        texts.join("\n")
    }
}
