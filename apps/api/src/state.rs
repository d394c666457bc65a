use std::sync::Arc;

use crate::config::Config;
use crate::pdf::PdfTextExtractor;
use crate::postings::repository::SurveyRepository;
use crate::questions::generator::QuestionGenerator;
use crate::storage::ObjectStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Collaborators are trait objects so the router can be exercised against
/// in-memory doubles.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub questions: QuestionGenerator,
    /// Selected at startup from `PDF_EXTRACTOR`.
    pub pdf_extractor: Arc<dyn PdfTextExtractor>,
    pub store: Arc<dyn ObjectStore>,
    pub repo: Arc<dyn SurveyRepository>,
}
