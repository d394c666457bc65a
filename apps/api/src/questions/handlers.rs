//! Axum route handlers for question generation.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::survey::SurveyQuestion;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionsResponse {
    pub questions: Vec<SurveyQuestion>,
}

/// POST /api/generate-questions
///
/// 400 on a missing or short description. Model failures still return 200 with
/// the fallback survey.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    body: Result<Json<GenerateQuestionsRequest>, JsonRejection>,
) -> Result<Json<GenerateQuestionsResponse>, AppError> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    let description = request.job_description.unwrap_or_default();

    let questions = state.questions.generate(&description).await?;

    Ok(Json(GenerateQuestionsResponse { questions }))
}
