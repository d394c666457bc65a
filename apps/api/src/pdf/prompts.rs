// Prompt constants for LLM-backed PDF text extraction.

use crate::llm_client::prompts::NO_COMMENTARY_INSTRUCTION;

const PDF_EXTRACTION_SYSTEM_BODY: &str = "You are an assistant that extracts and formats text from PDF documents. \
    Extract all visible text from the provided PDF, maintaining the structure where possible. \
    Present the data in a clean, readable format.";

pub fn pdf_extraction_system_prompt() -> String {
    format!("{PDF_EXTRACTION_SYSTEM_BODY} {NO_COMMENTARY_INSTRUCTION}")
}

pub const PDF_EXTRACTION_PROMPT: &str = "Extract the text from this PDF document.";

/// Upper bound on completion length for a single document.
pub const PDF_EXTRACTION_MAX_TOKENS: u32 = 4096;
