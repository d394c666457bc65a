//! Object storage for uploaded PDFs and recorded answers.
//!
//! Objects are written once and addressed by public URL afterwards; nothing in
//! the service reads them back.

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const AUDIO_CONTENT_TYPE: &str = "audio/webm";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of '{key}' to bucket '{bucket}' failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Storage(e.to_string())
    }
}

/// Write-once blob storage that hands back a public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// S3 / MinIO backed store.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Constructs a client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "survey-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.s3_region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        // MinIO only serves path-style URLs.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            public_base_url: config.s3_public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            })?;

        info!("Uploaded {size} bytes to s3://{bucket}/{key}");
        Ok(public_url(&self.public_base_url, bucket, key))
    }
}

pub fn public_url(base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), bucket, key)
}

/// `{unix_millis}_{filename}` with the filename reduced to URL-safe characters.
pub fn pdf_object_key(filename: &str, unix_millis: i64) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.trim_matches('_').is_empty() {
        "document.pdf".to_string()
    } else {
        safe
    };
    format!("{unix_millis}_{safe}")
}

/// `{posting_id}/{question_id}_{nonce}.webm`
pub fn audio_object_key(job_posting_id: Uuid, question_id: u32, nonce: Uuid) -> String {
    format!("{job_posting_id}/{question_id}_{nonce}.webm")
}
