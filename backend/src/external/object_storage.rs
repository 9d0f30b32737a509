//! Object storage client for report artifacts
//!
//! Talks to any S3-compatible provider (Filebase in production) through
//! `aws-sdk-s3` with a custom endpoint and static credentials.

use std::time::Duration;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::StorageConfig;

/// S3 accepts at most this many keys per DeleteObjects request
const MAX_DELETE_BATCH: usize = 1000;

/// Errors emitted by object storage operations.
///
/// Every variant carries the provider's full message, which the quota
/// recovery policy inspects.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },

    #[error("signing access URL for {key} failed: {message}")]
    Presign { key: String, message: String },

    #[error("listing objects under {prefix} failed: {message}")]
    List { prefix: String, message: String },

    #[error("batch delete failed: {message}")]
    Delete { message: String },
}

impl StorageError {
    /// Provider message without the operation context
    pub fn message(&self) -> &str {
        match self {
            StorageError::Upload { message, .. }
            | StorageError::Presign { message, .. }
            | StorageError::List { message, .. }
            | StorageError::Delete { message } => message,
        }
    }
}

/// Key and modification time of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Remote object storage used to publish report artifacts
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload `bytes` under `key`, replacing any existing object
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Time-limited URL granting read access to `key`
    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;

    /// All objects whose key starts with `prefix`
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError>;

    /// Delete the given keys
    async fn delete_many(&self, keys: &[String]) -> Result<(), StorageError>;
}

/// Content type inferred from the key's file extension
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// `ObjectStorage` backed by an S3-compatible bucket
#[derive(Clone)]
pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
}

impl S3ObjectStorage {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "cold-storage-config",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        tracing::debug!(key, content_type, size = bytes.len(), "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let presign_error = |message: String| StorageError::Presign {
            key: key.to_string(),
            message,
        };

        let presigning = PresigningConfig::expires_in(ttl).map_err(|e| presign_error(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| presign_error(DisplayErrorContext(&e).to_string()))?;

        Ok(request.uri().to_string())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::List {
                    prefix: prefix.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            for object in page.contents() {
                if let Some(key) = object.key() {
                    let last_modified = object
                        .last_modified()
                        .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()));
                    objects.push(StoredObject {
                        key: key.to_string(),
                        last_modified,
                    });
                }
            }

            match page.next_continuation_token() {
                Some(next) if page.is_truncated().unwrap_or(false) => {
                    continuation = Some(next.to_string());
                }
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), StorageError> {
        let delete_error = |message: String| StorageError::Delete { message };

        for chunk in keys.chunks(MAX_DELETE_BATCH) {
            let identifiers = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| delete_error(e.to_string()))?;

            let delete = Delete::builder()
                .set_objects(Some(identifiers))
                .quiet(true)
                .build()
                .map_err(|e| delete_error(e.to_string()))?;

            self.client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| delete_error(DisplayErrorContext(&e).to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_reports() {
        assert_eq!(content_type_for("report_2025-04-15.pdf"), "application/pdf");
        assert_eq!(content_type_for("photo.png"), "image/png");
        assert_eq!(content_type_for("no-extension"), "application/octet-stream");
    }

    #[test]
    fn test_storage_error_keeps_provider_message() {
        let err = StorageError::Upload {
            key: "report_2025-04-15.pdf".to_string(),
            message: "Storage quota exceeded".to_string(),
        };
        assert_eq!(err.message(), "Storage quota exceeded");
        assert!(err.to_string().contains("report_2025-04-15.pdf"));
    }
}
