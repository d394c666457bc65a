use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::survey::{JobPosting, NewSurveyResponse, SurveyQuestion, SurveyResponse};
use crate::wizard::recorder::{CaptureError, MediaCapture, Recorder, RecorderState};
use crate::wizard::{AudioBlob, ResponseSink};

#[allow(dead_code)]
pub const RECORDING_REQUIRED: &str = "Please record an answer before continuing";
#[allow(dead_code)]
pub const SAVE_FAILED: &str = "Failed to save your response. Please try again.";

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyPhase {
    Answering,
    Uploading,
    Complete,
}

/// Result of a successful "Next".
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum SurveyStep {
    Advanced(SurveyResponse),
    Complete(SurveyResponse),
}

/// Stores one recording and links it to its question.
pub async fn record_answer<S>(
    sink: &S,
    job_posting_id: Uuid,
    question_id: u32,
    audio: &AudioBlob,
) -> Result<SurveyResponse, AppError>
where
    S: ResponseSink + ?Sized,
{
    let audio_url = sink.upload_audio(job_posting_id, question_id, audio).await?;
    sink.save_response(NewSurveyResponse {
        job_posting_id,
        question_id,
        audio_url,
        transcript: None,
    })
    .await
}

/// A candidate's pass through a posting's questions, one recording each.
#[allow(dead_code)]
pub struct SurveySession<C: MediaCapture> {
    job_posting_id: Uuid,
    questions: Vec<SurveyQuestion>,
    index: usize,
    recorder: Recorder<C>,
    phase: SurveyPhase,
    error: Option<String>,
}

#[allow(dead_code)]
impl<C: MediaCapture> SurveySession<C> {
    pub fn new(posting: &JobPosting, capture: C) -> Result<Self, AppError> {
        if posting.questions.is_empty() {
            return Err(AppError::Validation(format!(
                "Job posting {} has no questions",
                posting.id
            )));
        }
        Ok(Self {
            job_posting_id: posting.id,
            questions: posting.questions.clone(),
            index: 0,
            recorder: Recorder::new(capture),
            phase: SurveyPhase::Answering,
            error: None,
        })
    }

    pub fn phase(&self) -> SurveyPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Zero-based index of the visible question.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> Option<&SurveyQuestion> {
        match self.phase {
            SurveyPhase::Complete => None,
            _ => self.questions.get(self.index),
        }
    }

    pub fn is_last_question(&self) -> bool {
        self.index + 1 == self.questions.len()
    }

    /// Progress bar fill, counting the visible question as started.
    pub fn progress_percent(&self) -> u8 {
        ((self.index + 1) * 100 / self.questions.len()) as u8
    }

    pub fn recorder(&self) -> &Recorder<C> {
        &self.recorder
    }

    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        if self.phase != SurveyPhase::Answering {
            return Ok(());
        }
        self.error = None;
        self.recorder.start()
    }

    pub fn stop_recording(&mut self) -> Option<&AudioBlob> {
        self.recorder.stop()
    }

    pub fn rerecord(&mut self) -> Result<(), CaptureError> {
        if self.phase != SurveyPhase::Answering {
            return Ok(());
        }
        self.recorder.rerecord()
    }

    pub fn can_go_next(&self) -> bool {
        self.phase == SurveyPhase::Answering && self.recorder.state() == RecorderState::Recorded
    }

    pub fn can_go_previous(&self) -> bool {
        self.phase == SurveyPhase::Answering
            && self.index > 0
            && self.recorder.state() != RecorderState::Recording
    }

    /// Moves back one question, discarding any unsaved recording. Returns
    /// false when nothing happened.
    pub fn previous(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.recorder.reset();
        self.index -= 1;
        self.error = None;
        true
    }

    /// Uploads the staged recording, saves the response, then advances or
    /// completes. On failure the candidate stays on the same question with the
    /// recording kept for a retry.
    pub async fn next<S>(&mut self, sink: &S) -> Result<SurveyStep, AppError>
    where
        S: ResponseSink + ?Sized,
    {
        if !self.can_go_next() {
            let message = match self.phase {
                SurveyPhase::Complete => "The survey is already complete",
                SurveyPhase::Uploading => "Your previous answer is still being saved",
                SurveyPhase::Answering => RECORDING_REQUIRED,
            };
            self.error = Some(message.to_string());
            return Err(AppError::Validation(message.to_string()));
        }
        let (Some(question), Some(audio)) =
            (self.current_question().cloned(), self.recorder.blob().cloned())
        else {
            return Err(AppError::Validation(RECORDING_REQUIRED.to_string()));
        };

        self.phase = SurveyPhase::Uploading;
        self.error = None;

        match record_answer(sink, self.job_posting_id, question.id, &audio).await {
            Ok(response) => {
                self.recorder.reset();
                if self.is_last_question() {
                    info!("Survey for posting {} complete", self.job_posting_id);
                    self.phase = SurveyPhase::Complete;
                    Ok(SurveyStep::Complete(response))
                } else {
                    self.index += 1;
                    self.phase = SurveyPhase::Answering;
                    Ok(SurveyStep::Advanced(response))
                }
            }
            Err(e) => {
                warn!(
                    "Saving answer to question {} of posting {} failed: {e}",
                    question.id, self.job_posting_id
                );
                self.phase = SurveyPhase::Answering;
                self.error = Some(SAVE_FAILED.to_string());
                Err(e)
            }
        }
    }
}
