//! Question generator: job description in, non-empty survey out.
//!
//! Flow: validate → build prompt → LLM → parse_questions → normalized list.
//!
//! Availability wins over correctness here: any upstream or format failure is
//! replaced by `fallback_questions()`. The failure is still emitted as a
//! structured warning so operators can see it. A missing API key is the one
//! exception; it is a deployment fault and is returned as `AppError::Config`.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{ChatRequest, ContentPart, LanguageModel, LlmError, CHAT_MODEL};
use crate::models::survey::SurveyQuestion;
use crate::questions::parser::{parse_questions, ParseError};
use crate::questions::prompts::{question_system_prompt, QUESTION_PROMPT_TEMPLATE};

/// Descriptions shorter than this (after trimming) are rejected.
pub const MIN_DESCRIPTION_CHARS: usize = 20;

#[derive(Debug, Error)]
enum GenerationError {
    #[error(transparent)]
    Upstream(#[from] LlmError),

    #[error(transparent)]
    Format(#[from] ParseError),
}

impl GenerationError {
    fn kind(&self) -> &'static str {
        match self {
            GenerationError::Upstream(_) => "upstream",
            GenerationError::Format(_) => "format",
        }
    }
}

#[derive(Clone)]
pub struct QuestionGenerator {
    llm: Arc<dyn LanguageModel>,
}

impl QuestionGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Returns an ordered, non-empty question list for `description`.
    ///
    /// Only validation and configuration problems are returned as errors.
    pub async fn generate(&self, description: &str) -> Result<Vec<SurveyQuestion>, AppError> {
        let description = validate_description(description)?;

        match self.request_questions(description).await {
            Ok(questions) => {
                info!("Generated {} survey questions", questions.len());
                Ok(questions)
            }
            Err(GenerationError::Upstream(LlmError::MissingApiKey)) => {
                Err(LlmError::MissingApiKey.into())
            }
            Err(e) => {
                warn!(
                    target: "survey_api::questions",
                    error_kind = e.kind(),
                    error = %e,
                    description_chars = description.chars().count(),
                    "Question generation failed; serving fallback questions"
                );
                Ok(fallback_questions())
            }
        }
    }

    async fn request_questions(
        &self,
        description: &str,
    ) -> Result<Vec<SurveyQuestion>, GenerationError> {
        let request = ChatRequest::new(CHAT_MODEL, question_system_prompt()).with_part(
            ContentPart::text(QUESTION_PROMPT_TEMPLATE.replace("{job_description}", description)),
        );
        let raw = self.llm.complete(&request).await?;
        Ok(parse_questions(&raw)?)
    }
}

/// Trims and length-checks a job description.
pub fn validate_description(description: &str) -> Result<&str, AppError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Job description is required".to_string(),
        ));
    }
    if trimmed.chars().count() < MIN_DESCRIPTION_CHARS {
        return Err(AppError::Validation(
            "Job description is too short. Please provide more details.".to_string(),
        ));
    }
    Ok(trimmed)
}

/// Fixed survey served whenever generation cannot produce one.
pub fn fallback_questions() -> Vec<SurveyQuestion> {
    [
        (
            "What specific skills and technologies are most important for this role?",
            "skills",
        ),
        (
            "Could you describe the team structure this position would be part of?",
            "team",
        ),
        (
            "What would success look like for this role in the first 90 days?",
            "success_metrics",
        ),
        (
            "What is the company culture like, especially regarding work-life balance?",
            "culture",
        ),
        (
            "Are there any additional qualifications or experiences that might not be in the job posting but would be valuable?",
            "qualifications",
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(|((question, category), id)| SurveyQuestion {
        id,
        question: question.to_string(),
        category: category.to_string(),
    })
    .collect()
}
