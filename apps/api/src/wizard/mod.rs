//! Client-side wizards as explicit state machines.
//!
//! `form` walks a recruiter from PDF/manual input to a persisted posting;
//! `recorder` and `survey` walk a candidate through one voice answer per
//! question. Side effects go through `FormBackend` and `ResponseSink`, which
//! the service implements in-process (see `postings::service`).

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::survey::{
    JobPosting, NewJobPosting, NewSurveyResponse, SurveyQuestion, SurveyResponse,
};
use crate::pdf::PdfUpload;

pub mod form;
// Driven by `survey::SurveySession`, which only the client build and tests run.
#[allow(dead_code)]
pub mod recorder;
pub mod survey;

pub use recorder::AudioBlob;

/// Everything the posting form needs from the outside world.
#[async_trait]
pub trait FormBackend: Send + Sync {
    async fn extract_text(&self, pdf: &PdfUpload) -> Result<String, AppError>;

    async fn generate_questions(&self, description: &str)
        -> Result<Vec<SurveyQuestion>, AppError>;

    /// Stores the original document and returns its public URL.
    async fn upload_pdf(&self, pdf: &PdfUpload) -> Result<String, AppError>;

    async fn create_posting(&self, posting: NewJobPosting) -> Result<JobPosting, AppError>;
}

/// Where finished answers go.
#[async_trait]
pub trait ResponseSink: Send + Sync {
    /// Stores the recording and returns its public URL.
    async fn upload_audio(
        &self,
        job_posting_id: Uuid,
        question_id: u32,
        audio: &AudioBlob,
    ) -> Result<String, AppError>;

    async fn save_response(&self, response: NewSurveyResponse) -> Result<SurveyResponse, AppError>;
}
