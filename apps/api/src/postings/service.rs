//! The service's own implementation of the wizard backends.
//!
//! HTTP handlers drive `SurveyForm` and `record_answer` with `AppState` as the
//! backend, so browser clients and server-side submissions share one sequence.

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::survey::{
    JobPosting, NewJobPosting, NewSurveyResponse, SurveyQuestion, SurveyResponse,
};
use crate::pdf::PdfUpload;
use crate::state::AppState;
use crate::storage::{audio_object_key, pdf_object_key, PDF_CONTENT_TYPE};
use crate::wizard::{AudioBlob, FormBackend, ResponseSink};

#[async_trait]
impl FormBackend for AppState {
    async fn extract_text(&self, pdf: &PdfUpload) -> Result<String, AppError> {
        Ok(self.pdf_extractor.extract_text(pdf).await?)
    }

    async fn generate_questions(
        &self,
        description: &str,
    ) -> Result<Vec<SurveyQuestion>, AppError> {
        self.questions.generate(description).await
    }

    async fn upload_pdf(&self, pdf: &PdfUpload) -> Result<String, AppError> {
        let key = pdf_object_key(&pdf.filename, chrono::Utc::now().timestamp_millis());
        Ok(self
            .store
            .put_object(
                &self.config.s3_pdf_bucket,
                &key,
                pdf.bytes.clone(),
                PDF_CONTENT_TYPE,
            )
            .await?)
    }

    async fn create_posting(&self, posting: NewJobPosting) -> Result<JobPosting, AppError> {
        if posting.questions.is_empty() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "refusing to persist a job posting without questions"
            )));
        }
        self.repo.insert_job_posting(posting).await
    }
}

#[async_trait]
impl ResponseSink for AppState {
    async fn upload_audio(
        &self,
        job_posting_id: Uuid,
        question_id: u32,
        audio: &AudioBlob,
    ) -> Result<String, AppError> {
        let key = audio_object_key(job_posting_id, question_id, Uuid::new_v4());
        Ok(self
            .store
            .put_object(
                &self.config.s3_audio_bucket,
                &key,
                Bytes::clone(&audio.bytes),
                audio.content_type,
            )
            .await?)
    }

    async fn save_response(&self, response: NewSurveyResponse) -> Result<SurveyResponse, AppError> {
        self.repo.insert_survey_response(response).await
    }
}

/// Loads a posting or fails with 404.
pub async fn require_posting(state: &AppState, id: Uuid) -> Result<JobPosting, AppError> {
    state
        .repo
        .get_job_posting(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job posting {id} not found")))
}
