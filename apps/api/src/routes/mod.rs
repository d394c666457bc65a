pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pdf::handlers::handle_extract_pdf_text;
use crate::postings::handlers as postings;
use crate::questions::handlers::handle_generate_questions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Survey generation
        .route("/api/generate-questions", post(handle_generate_questions))
        .route("/api/extract-pdf-text", post(handle_extract_pdf_text))
        // Postings and recorded answers
        .route(
            "/api/job-postings",
            post(postings::handle_create_job_posting),
        )
        .route(
            "/api/job-postings/:id",
            get(postings::handle_get_job_posting),
        )
        .route(
            "/api/job-postings/:id/responses",
            get(postings::handle_list_responses).post(postings::handle_submit_response),
        )
        .layer(body_limit)
        .with_state(state)
}
