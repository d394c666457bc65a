use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every error renders as `{"error": "<message>"}`. Server-side variants log
/// their detail and return a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// LLM or object storage call failed (network, non-2xx).
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// LLM output could not be decoded into the expected shape.
    #[error("Format error: {0}")]
    Format(String),

    #[error("PDF extraction error: {0}")]
    Extraction(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => AppError::Config(e.to_string()),
            LlmError::EmptyContent => AppError::Format(e.to_string()),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                "An upstream service error occurred".to_string()
            }
            AppError::Format(msg) => {
                tracing::error!("Format error: {msg}");
                "The AI response could not be understood".to_string()
            }
            AppError::Extraction(msg) => {
                tracing::error!("PDF extraction error: {msg}");
                "Failed to extract text from PDF".to_string()
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                "A storage error occurred".to_string()
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {msg}");
                "The server is missing required configuration".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "A database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "Failed to process request".to_string()
            }
        };

        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
