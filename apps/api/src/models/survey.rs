use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One generated prompt a candidate answers by voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    /// 1-based position within the posting's survey.
    pub id: u32,
    pub question: String,
    pub category: String,
}

/// A recruiter-submitted role description plus its generated survey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub pdf_url: Option<String>,
    pub questions: Vec<SurveyQuestion>,
    pub created_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn question(&self, question_id: u32) -> Option<&SurveyQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

/// Fields supplied when a posting is created; id and timestamp come from the store.
#[derive(Debug, Clone)]
pub struct NewJobPosting {
    pub title: String,
    pub description: String,
    pub pdf_url: Option<String>,
    pub questions: Vec<SurveyQuestion>,
}

/// A recorded answer linked to one question of one posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: Uuid,
    pub job_posting_id: Uuid,
    pub question_id: u32,
    pub audio_url: String,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSurveyResponse {
    pub job_posting_id: Uuid,
    pub question_id: u32,
    pub audio_url: String,
    pub transcript: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct JobPostingRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub pdf_url: Option<String>,
    pub questions: Json<Vec<SurveyQuestion>>,
    pub created_at: DateTime<Utc>,
}

impl From<JobPostingRow> for JobPosting {
    fn from(row: JobPostingRow) -> Self {
        JobPosting {
            id: row.id,
            title: row.title,
            description: row.description,
            pdf_url: row.pdf_url,
            questions: row.questions.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct SurveyResponseRow {
    pub id: Uuid,
    pub job_posting_id: Uuid,
    pub question_id: i32,
    pub audio_url: String,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SurveyResponseRow> for SurveyResponse {
    type Error = anyhow::Error;

    fn try_from(row: SurveyResponseRow) -> Result<Self, Self::Error> {
        let question_id = u32::try_from(row.question_id).with_context(|| {
            format!(
                "survey response {} has out-of-range question_id {}",
                row.id, row.question_id
            )
        })?;

        Ok(SurveyResponse {
            id: row.id,
            job_posting_id: row.job_posting_id,
            question_id,
            audio_url: row.audio_url,
            transcript: row.transcript,
            created_at: row.created_at,
        })
    }
}
