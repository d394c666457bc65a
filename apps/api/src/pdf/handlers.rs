//! Axum route handler for PDF text extraction.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::pdf::PdfUpload;
use crate::state::AppState;

pub const PDF_FIELD: &str = "pdfFile";

#[derive(Debug, Serialize)]
pub struct ExtractTextResponse {
    pub text: String,
}

/// POST /api/extract-pdf-text
///
/// Multipart form with a `pdfFile` entry. A readable document without text
/// returns 200 with the no-text sentinel.
pub async fn handle_extract_pdf_text(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, AppError> {
    let mut upload: Option<PdfUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart: {e}")))?
    {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read PDF upload: {e}")))?;
        if !bytes.is_empty() {
            upload = Some(PdfUpload::new(filename, bytes));
        }
    }

    let pdf = upload.ok_or_else(|| AppError::Validation("No PDF file provided".to_string()))?;
    info!("Extracting text from '{}' ({} bytes)", pdf.filename, pdf.bytes.len());

    let text = state.pdf_extractor.extract_text(&pdf).await?;

    Ok(Json(ExtractTextResponse { text }))
}
