//! In-memory doubles for the service's external collaborators.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use uuid::Uuid;

use crate::config::{Config, PdfExtractorKind};
use crate::errors::AppError;
use crate::llm_client::{ChatRequest, LanguageModel, LlmError};
use crate::models::survey::{JobPosting, NewJobPosting, NewSurveyResponse, SurveyResponse};
use crate::pdf::{ExtractError, PdfTextExtractor, PdfUpload};
use crate::postings::repository::SurveyRepository;
use crate::questions::generator::QuestionGenerator;
use crate::state::AppState;
use crate::storage::{public_url, ObjectStore, StorageError};
use crate::wizard::recorder::{CaptureError, CaptureStream, MediaCapture};

const TEST_STORAGE_URL: &str = "http://storage.test";

const DEFAULT_QUESTIONS_JSON: &str = r#"{"questions": [
    {"id": 1, "question": "What does a typical week look like?", "category": "culture"},
    {"id": 2, "question": "Which systems will I own first?", "category": "skills"},
    {"id": 3, "question": "How is success measured after six months?", "category": "success_metrics"}
]}"#;

const DEFAULT_EXTRACTED_TEXT: &str =
    "Backend engineer owning the billing service and its on-call rotation.";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/survey_test".to_string(),
        s3_endpoint: TEST_STORAGE_URL.to_string(),
        s3_region: "us-east-1".to_string(),
        s3_public_url: TEST_STORAGE_URL.to_string(),
        s3_pdf_bucket: "job-pdfs".to_string(),
        s3_audio_bucket: "audio-recordings".to_string(),
        aws_access_key_id: "test".to_string(),
        aws_secret_access_key: "test".to_string(),
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: "http://llm.test/v1".to_string(),
        pdf_extractor: PdfExtractorKind::Local,
        max_upload_bytes: 25 * 1024 * 1024,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

// ── language model ──────────────────────────────────────────────────────────

type ErrorFactory = Box<dyn Fn() -> LlmError + Send + Sync>;

/// Scripted model that records every request it receives.
pub struct MockLanguageModel {
    reply: Result<String, ErrorFactory>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockLanguageModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: impl Fn() -> LlmError + Send + Sync + 'static) -> Self {
        Self {
            reply: Err(Box::new(error)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}

// ── pdf extraction ──────────────────────────────────────────────────────────

pub struct StaticExtractor {
    text: Option<String>,
    calls: AtomicUsize,
}

impl StaticExtractor {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfTextExtractor for StaticExtractor {
    async fn extract_text(&self, _pdf: &PdfUpload) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text
            .clone()
            .ok_or_else(|| ExtractError::Parse("corrupt xref table".to_string()))
    }
}

// ── object storage ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
}

#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<Vec<StoredObject>>,
    failing: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn content_type_of_last(&self) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .last()
            .map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        _body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "connection refused".to_string(),
            });
        }
        self.objects.lock().unwrap().push(StoredObject {
            content_type: content_type.to_string(),
        });
        Ok(public_url(TEST_STORAGE_URL, bucket, key))
    }
}

// ── repository ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySurveyRepository {
    postings: Mutex<Vec<JobPosting>>,
    responses: Mutex<Vec<SurveyResponse>>,
    failing: bool,
}

impl InMemorySurveyRepository {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn response_count(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SurveyRepository for InMemorySurveyRepository {
    async fn insert_job_posting(&self, posting: NewJobPosting) -> Result<JobPosting, AppError> {
        self.check()?;
        let posting = JobPosting {
            id: Uuid::new_v4(),
            title: posting.title,
            description: posting.description,
            pdf_url: posting.pdf_url,
            questions: posting.questions,
            created_at: Utc::now(),
        };
        self.postings.lock().unwrap().push(posting.clone());
        Ok(posting)
    }

    async fn get_job_posting(&self, id: Uuid) -> Result<Option<JobPosting>, AppError> {
        self.check()?;
        Ok(self
            .postings
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn insert_survey_response(
        &self,
        response: NewSurveyResponse,
    ) -> Result<SurveyResponse, AppError> {
        self.check()?;
        let response = SurveyResponse {
            id: Uuid::new_v4(),
            job_posting_id: response.job_posting_id,
            question_id: response.question_id,
            audio_url: response.audio_url,
            transcript: response.transcript,
            created_at: Utc::now(),
        };
        self.responses.lock().unwrap().push(response.clone());
        Ok(response)
    }

    async fn list_survey_responses(
        &self,
        job_posting_id: Uuid,
    ) -> Result<Vec<SurveyResponse>, AppError> {
        self.check()?;
        let mut responses: Vec<SurveyResponse> = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.job_posting_id == job_posting_id)
            .cloned()
            .collect();
        responses.sort_by_key(|r| (r.question_id, r.created_at));
        Ok(responses)
    }
}

// ── microphone ──────────────────────────────────────────────────────────────

/// Microphone double. Clones share the open-stream counter.
#[derive(Clone)]
pub struct FakeMicrophone {
    chunks: Vec<&'static [u8]>,
    denied: bool,
    open: Arc<AtomicUsize>,
}

impl Default for FakeMicrophone {
    fn default() -> Self {
        Self::with_chunks(vec![&b"webm-audio"[..]])
    }
}

impl FakeMicrophone {
    pub fn with_chunks(chunks: Vec<&'static [u8]>) -> Self {
        Self {
            chunks,
            denied: false,
            open: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }

    /// Streams opened and not yet released.
    pub fn open_streams(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl MediaCapture for FakeMicrophone {
    type Stream = FakeStream;

    fn open(&mut self) -> Result<FakeStream, CaptureError> {
        if self.denied {
            return Err(CaptureError::PermissionDenied);
        }
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(FakeStream {
            chunks: self.chunks.iter().map(|c| Bytes::from_static(c)).collect(),
            open: self.open.clone(),
        })
    }
}

pub struct FakeStream {
    chunks: Vec<Bytes>,
    open: Arc<AtomicUsize>,
}

impl CaptureStream for FakeStream {
    fn finish(mut self) -> Vec<Bytes> {
        std::mem::take(&mut self.chunks)
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

// ── multipart ───────────────────────────────────────────────────────────────

const BOUNDARY: &str = "survey-test-boundary";

pub struct MultipartPart<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    data: &'a [u8],
}

impl<'a> MultipartPart<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            data,
        }
    }
}

/// Encodes parts as `multipart/form-data`, returning the content type header
/// value and the body.
pub fn multipart_body(parts: &[MultipartPart<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

// ── state ───────────────────────────────────────────────────────────────────

pub struct TestStateBuilder {
    llm: Arc<dyn LanguageModel>,
    extractor: Arc<dyn PdfTextExtractor>,
    store: Arc<dyn ObjectStore>,
    repo: Arc<dyn SurveyRepository>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            llm: Arc::new(MockLanguageModel::replying(DEFAULT_QUESTIONS_JSON)),
            extractor: Arc::new(StaticExtractor::text(DEFAULT_EXTRACTED_TEXT)),
            store: Arc::new(InMemoryObjectStore::default()),
            repo: Arc::new(InMemorySurveyRepository::default()),
        }
    }

    pub fn llm(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = llm;
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn PdfTextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn store(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.store = store;
        self
    }

    pub fn repository(mut self, repo: Arc<dyn SurveyRepository>) -> Self {
        self.repo = repo;
        self
    }

    pub fn failing_repository(self) -> Self {
        self.repository(Arc::new(InMemorySurveyRepository::failing()))
    }

    pub fn build(self) -> AppState {
        AppState {
            config: test_config(),
            questions: QuestionGenerator::new(self.llm),
            pdf_extractor: self.extractor,
            store: self.store,
            repo: self.repo,
        }
    }
}
