use std::sync::Arc;

use async_trait::async_trait;

use super::prompts::{
    pdf_extraction_system_prompt, PDF_EXTRACTION_MAX_TOKENS, PDF_EXTRACTION_PROMPT,
};
use super::{ensure_pdf, or_sentinel, ExtractError, PdfTextExtractor, PdfUpload, NO_TEXT_SENTINEL};
use crate::llm_client::{ChatRequest, ContentPart, LanguageModel, LlmError, DOCUMENT_MODEL};

/// Sends the whole document to a multimodal model and returns its transcription.
#[derive(Clone)]
pub struct LlmPdfExtractor {
    llm: Arc<dyn LanguageModel>,
}

impl LlmPdfExtractor {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl PdfTextExtractor for LlmPdfExtractor {
    #[tracing::instrument(skip(self, pdf), fields(filename = %pdf.filename, bytes = pdf.bytes.len()))]
    async fn extract_text(&self, pdf: &PdfUpload) -> Result<String, ExtractError> {
        ensure_pdf(pdf)?;

        let request = ChatRequest::new(DOCUMENT_MODEL, pdf_extraction_system_prompt())
            .with_part(ContentPart::text(PDF_EXTRACTION_PROMPT))
            .with_part(ContentPart::pdf(&pdf.filename, &pdf.bytes))
            .with_max_tokens(PDF_EXTRACTION_MAX_TOKENS);

        match self.llm.complete(&request).await {
            Ok(text) => Ok(or_sentinel(text)),
            Err(LlmError::EmptyContent) => Ok(NO_TEXT_SENTINEL.to_string()),
            Err(e) => Err(e.into()),
        }
    }
}
