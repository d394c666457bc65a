use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::survey::{JobPosting, NewJobPosting};
use crate::pdf::{is_unusable_text, PdfUpload};
use crate::wizard::FormBackend;

pub const TITLE_REQUIRED: &str = "Job title is required";
pub const DESCRIPTION_REQUIRED: &str =
    "Job description is required. Please either upload a PDF or enter the description manually.";
pub const EXTRACTION_EMPTY: &str = "Could not extract text from PDF. Please enter text manually.";
pub const EXTRACTION_FAILED: &str =
    "Unable to parse PDF. Please enter the job description manually.";
pub const SUBMISSION_FAILED: &str = "Failed to process job posting. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Extracting,
    ManualEntry,
    ReadyToSubmit,
    Submitting,
    /// Terminal. The client navigates to the survey for this posting.
    Submitted(Uuid),
    Error,
}

/// Which text the posting description is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSource {
    Manual,
    Extracted,
}

/// The recruiter's job posting form.
///
/// Manual entry is the default source. A successful PDF extraction switches to
/// the extracted text; a failed or empty one forces manual entry back on
/// without dropping the attached PDF.
#[derive(Debug, Clone)]
pub struct SurveyForm {
    title: String,
    manual_text: String,
    extracted_text: Option<String>,
    pdf: Option<PdfUpload>,
    source: DescriptionSource,
    state: FormState,
    error: Option<String>,
}

impl Default for SurveyForm {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyForm {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            manual_text: String::new(),
            extracted_text: None,
            pdf: None,
            source: DescriptionSource::Manual,
            state: FormState::Idle,
            error: None,
        }
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[allow(dead_code)]
    pub fn source(&self) -> DescriptionSource {
        self.source
    }

    #[allow(dead_code)]
    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.refresh();
    }

    pub fn set_manual_text(&mut self, text: impl Into<String>) {
        self.manual_text = text.into();
        self.refresh();
    }

    /// Switches the description source back to the manual text box.
    pub fn use_manual_entry(&mut self) {
        self.source = DescriptionSource::Manual;
        self.refresh();
    }

    /// Attaches a PDF and tries to pull the description out of it.
    pub async fn select_file<B>(&mut self, pdf: PdfUpload, backend: &B)
    where
        B: FormBackend + ?Sized,
    {
        if self.is_busy() {
            return;
        }
        self.state = FormState::Extracting;
        self.error = None;

        let outcome = backend.extract_text(&pdf).await;
        self.pdf = Some(pdf);
        self.state = FormState::Idle;

        match outcome {
            Ok(text) if !is_unusable_text(&text) => {
                self.extracted_text = Some(text);
                self.source = DescriptionSource::Extracted;
                self.refresh();
            }
            Ok(_) => self.force_manual_entry(EXTRACTION_EMPTY),
            Err(e) => {
                warn!("PDF text extraction failed: {e}");
                self.force_manual_entry(EXTRACTION_FAILED);
            }
        }
    }

    /// Attaches a PDF for upload only. The manual text stays the description.
    pub fn attach_file(&mut self, pdf: PdfUpload) {
        if self.is_busy() {
            return;
        }
        self.pdf = Some(pdf);
        self.source = DescriptionSource::Manual;
        self.refresh();
    }

    /// The description from the active source.
    pub fn description(&self) -> &str {
        match self.source {
            DescriptionSource::Manual => &self.manual_text,
            DescriptionSource::Extracted => self.extracted_text.as_deref().unwrap_or_default(),
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.is_busy() && !self.title.trim().is_empty() && !self.description().trim().is_empty()
    }

    /// Generates questions, stores the PDF if there is one, and persists the
    /// posting. PDF upload failures are logged and the posting is created
    /// without a document link.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<JobPosting, AppError>
    where
        B: FormBackend + ?Sized,
    {
        if self.is_busy() {
            return Err(AppError::Validation(
                "A submission is already in progress".to_string(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(self.reject(TITLE_REQUIRED));
        }
        if self.description().trim().is_empty() {
            return Err(self.reject(DESCRIPTION_REQUIRED));
        }

        self.state = FormState::Submitting;
        self.error = None;

        match self.run_submission(backend).await {
            Ok(posting) => {
                info!(
                    "Created job posting {} with {} questions",
                    posting.id,
                    posting.questions.len()
                );
                self.state = FormState::Submitted(posting.id);
                Ok(posting)
            }
            Err(e) => {
                self.state = FormState::Error;
                self.error = Some(match &e {
                    AppError::Validation(msg) => msg.clone(),
                    _ => SUBMISSION_FAILED.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Where the client navigates once the posting exists.
    #[allow(dead_code)]
    pub fn survey_path(&self) -> Option<String> {
        match &self.state {
            FormState::Submitted(id) => Some(format!("/survey/{id}")),
            _ => None,
        }
    }

    async fn run_submission<B>(&self, backend: &B) -> Result<JobPosting, AppError>
    where
        B: FormBackend + ?Sized,
    {
        let description = self.description().trim().to_string();
        let questions = backend.generate_questions(&description).await?;

        let pdf_url = match &self.pdf {
            Some(pdf) => match backend.upload_pdf(pdf).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("PDF upload failed, continuing without it: {e}");
                    None
                }
            },
            None => None,
        };

        backend
            .create_posting(NewJobPosting {
                title: self.title.trim().to_string(),
                description,
                pdf_url,
                questions,
            })
            .await
    }

    fn is_busy(&self) -> bool {
        matches!(
            self.state,
            FormState::Extracting | FormState::Submitting | FormState::Submitted(_)
        )
    }

    fn force_manual_entry(&mut self, message: &str) {
        self.extracted_text = None;
        self.source = DescriptionSource::Manual;
        self.error = Some(message.to_string());
        self.state = FormState::ManualEntry;
    }

    fn reject(&mut self, message: &str) -> AppError {
        self.error = Some(message.to_string());
        AppError::Validation(message.to_string())
    }

    /// Recomputes the resting state after an edit.
    fn refresh(&mut self) {
        if self.is_busy() {
            return;
        }
        self.state = if self.can_submit() {
            FormState::ReadyToSubmit
        } else if self.source == DescriptionSource::Manual
            && (self.pdf.is_some() || !self.manual_text.is_empty())
        {
            FormState::ManualEntry
        } else {
            FormState::Idle
        };
    }
}
