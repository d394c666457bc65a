use anyhow::{bail, Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Which backend turns uploaded PDFs into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfExtractorKind {
    /// Local text-layer parsing via pdf-extract.
    Local,
    /// Multimodal chat completion that reads the document.
    Llm,
}

impl std::str::FromStr for PdfExtractorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "llm" => Ok(Self::Llm),
            other => bail!("PDF_EXTRACTOR must be 'local' or 'llm', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
///
/// `openai_api_key` is deliberately optional here: the LLM client checks for it
/// on every call and reports its absence as a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_public_url: String,
    pub s3_pdf_bucket: String,
    pub s3_audio_bucket: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub pdf_extractor: PdfExtractorKind,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3_endpoint = require_env("S3_ENDPOINT")?;
        let max_upload_mb = optional_env("MAX_UPLOAD_MB")
            .unwrap_or_else(|| "25".to_string())
            .parse::<usize>()
            .context("MAX_UPLOAD_MB must be a whole number of megabytes")?;

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_public_url: optional_env("S3_PUBLIC_URL").unwrap_or_else(|| s3_endpoint.clone()),
            s3_endpoint,
            s3_region: optional_env("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            s3_pdf_bucket: optional_env("S3_PDF_BUCKET").unwrap_or_else(|| "job-pdfs".to_string()),
            s3_audio_bucket: optional_env("S3_AUDIO_BUCKET")
                .unwrap_or_else(|| "audio-recordings".to_string()),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            pdf_extractor: optional_env("PDF_EXTRACTOR")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(PdfExtractorKind::Local),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an env var, treating blank values the same as unset ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
