//! Axum route handlers for job postings and their recorded answers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::survey::{JobPosting, SurveyResponse};
use crate::pdf::{handlers::PDF_FIELD, PdfUpload};
use crate::postings::service::require_posting;
use crate::state::AppState;
use crate::wizard::form::SurveyForm;
use crate::wizard::survey::record_answer;
use crate::wizard::AudioBlob;

const TITLE_FIELD: &str = "title";
const DESCRIPTION_FIELD: &str = "description";
const QUESTION_ID_FIELD: &str = "questionId";
const AUDIO_FIELD: &str = "audio";

#[derive(Debug, Serialize)]
pub struct ListResponsesResponse {
    pub responses: Vec<SurveyResponse>,
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Failed to read multipart: {e}"))
}

/// POST /api/job-postings
///
/// Multipart form with `title`, plus a `description`, a `pdfFile`, or both.
/// A non-blank `description` wins over extracted PDF text; the PDF is still
/// stored. Returns 201 with the persisted posting.
pub async fn handle_create_job_posting(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    let mut title = String::new();
    let mut description = String::new();
    let mut pdf: Option<PdfUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(TITLE_FIELD) => title = field.text().await.map_err(multipart_error)?,
            Some(DESCRIPTION_FIELD) => description = field.text().await.map_err(multipart_error)?,
            Some(PDF_FIELD) => {
                let filename = field.file_name().unwrap_or("document.pdf").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !bytes.is_empty() {
                    pdf = Some(PdfUpload::new(filename, bytes));
                }
            }
            _ => {}
        }
    }

    let mut form = SurveyForm::new();
    form.set_title(title);
    form.set_manual_text(description.as_str());

    match pdf {
        Some(pdf) if description.trim().is_empty() => form.select_file(pdf, &state).await,
        Some(pdf) => form.attach_file(pdf),
        None => {}
    }

    // Extraction gave nothing and no manual text was sent.
    if form.description().trim().is_empty() {
        if let Some(message) = form.error() {
            return Err(AppError::Validation(message.to_string()));
        }
    }

    let posting = form.submit(&state).await?;
    Ok((StatusCode::CREATED, Json(posting)))
}

/// GET /api/job-postings/:id
pub async fn handle_get_job_posting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    Ok(Json(require_posting(&state, id).await?))
}

/// POST /api/job-postings/:id/responses
///
/// Multipart form with `questionId` and an `audio` recording. The question
/// must belong to the posting.
pub async fn handle_submit_response(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SurveyResponse>), AppError> {
    let mut question_id: Option<String> = None;
    let mut audio: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(QUESTION_ID_FIELD) => {
                question_id = Some(field.text().await.map_err(multipart_error)?)
            }
            Some(AUDIO_FIELD) => audio = Some(field.bytes().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let posting = require_posting(&state, id).await?;

    let question_id = question_id
        .ok_or_else(|| AppError::Validation("questionId is required".to_string()))?
        .trim()
        .parse::<u32>()
        .map_err(|_| AppError::Validation("questionId must be a positive integer".to_string()))?;
    if posting.question(question_id).is_none() {
        return Err(AppError::Validation(format!(
            "Question {question_id} does not belong to job posting {id}"
        )));
    }

    let audio = audio
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::Validation("No audio recording provided".to_string()))?;
    info!(
        "Recording answer to question {question_id} of posting {id} ({} bytes)",
        audio.len()
    );

    let response = record_answer(&state, id, question_id, &AudioBlob::webm(audio)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/job-postings/:id/responses
pub async fn handle_list_responses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListResponsesResponse>, AppError> {
    require_posting(&state, id).await?;
    let responses = state.repo.list_survey_responses(id).await?;
    Ok(Json(ListResponsesResponse { responses }))
}
