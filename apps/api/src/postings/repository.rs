use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::survey::{
    JobPosting, JobPostingRow, NewJobPosting, NewSurveyResponse, SurveyResponse,
    SurveyResponseRow,
};

/// Row store for postings and responses. Rows are insert-only.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    async fn insert_job_posting(&self, posting: NewJobPosting) -> Result<JobPosting, AppError>;

    async fn get_job_posting(&self, id: Uuid) -> Result<Option<JobPosting>, AppError>;

    async fn insert_survey_response(
        &self,
        response: NewSurveyResponse,
    ) -> Result<SurveyResponse, AppError>;

    /// Responses for one posting, ordered by question id then creation time.
    async fn list_survey_responses(
        &self,
        job_posting_id: Uuid,
    ) -> Result<Vec<SurveyResponse>, AppError>;
}

#[derive(Clone)]
pub struct PgSurveyRepository {
    pool: PgPool,
}

impl PgSurveyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveyRepository for PgSurveyRepository {
    async fn insert_job_posting(&self, posting: NewJobPosting) -> Result<JobPosting, AppError> {
        let id = Uuid::new_v4();

        let row = sqlx::query_as::<_, JobPostingRow>(
            r#"
            INSERT INTO job_postings (id, title, description, pdf_url, questions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, pdf_url, questions, created_at
            "#,
        )
        .bind(id)
        .bind(&posting.title)
        .bind(&posting.description)
        .bind(&posting.pdf_url)
        .bind(Json(&posting.questions))
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted job posting {id}");
        Ok(row.into())
    }

    async fn get_job_posting(&self, id: Uuid) -> Result<Option<JobPosting>, AppError> {
        let row = sqlx::query_as::<_, JobPostingRow>(
            "SELECT id, title, description, pdf_url, questions, created_at FROM job_postings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert_survey_response(
        &self,
        response: NewSurveyResponse,
    ) -> Result<SurveyResponse, AppError> {
        let id = Uuid::new_v4();
        let question_id = i32::try_from(response.question_id).map_err(|_| {
            AppError::Validation(format!("Question id {} is out of range", response.question_id))
        })?;

        let row = sqlx::query_as::<_, SurveyResponseRow>(
            r#"
            INSERT INTO survey_responses (id, job_posting_id, question_id, audio_url, transcript)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, job_posting_id, question_id, audio_url, transcript, created_at
            "#,
        )
        .bind(id)
        .bind(response.job_posting_id)
        .bind(question_id)
        .bind(&response.audio_url)
        .bind(&response.transcript)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Inserted survey response {id} for posting {} question {}",
            response.job_posting_id, response.question_id
        );
        Ok(SurveyResponse::try_from(row)?)
    }

    async fn list_survey_responses(
        &self,
        job_posting_id: Uuid,
    ) -> Result<Vec<SurveyResponse>, AppError> {
        let rows = sqlx::query_as::<_, SurveyResponseRow>(
            r#"
            SELECT id, job_posting_id, question_id, audio_url, transcript, created_at
            FROM survey_responses
            WHERE job_posting_id = $1
            ORDER BY question_id, created_at
            "#,
        )
        .bind(job_posting_id)
        .fetch_all(&self.pool)
        .await?;

        let responses = rows
            .into_iter()
            .map(SurveyResponse::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(responses)
    }
}
