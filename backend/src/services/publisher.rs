//! Artifact publisher: upload, sign and index a rendered report

use std::sync::Arc;
use std::time::Duration;

use shared::{report_file_name, ReportIndexEntry};

use super::quota::QuotaRecoveryPolicy;
use super::report_index::ReportIndexStore;
use crate::error::AppResult;
use crate::external::{content_type_for, ObjectStorage};

/// A report that has been uploaded and indexed
#[derive(Debug, Clone)]
pub struct PublishedReport {
    pub file_name: String,
    /// Signed, time-limited access URL
    pub url: String,
    pub entry: ReportIndexEntry,
}

#[derive(Clone)]
pub struct ArtifactPublisher {
    storage: Arc<dyn ObjectStorage>,
    index: Arc<dyn ReportIndexStore>,
    quota: QuotaRecoveryPolicy,
    url_ttl: Duration,
}

impl ArtifactPublisher {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        index: Arc<dyn ReportIndexStore>,
        quota: QuotaRecoveryPolicy,
        url_ttl: Duration,
    ) -> Self {
        Self {
            storage,
            index,
            quota,
            url_ttl,
        }
    }

    /// Publish the report for `date_key` (`YYYY-MM-DD`). Re-publishing the
    /// same date replaces both the stored object and the index entry.
    pub async fn publish(&self, bytes: Vec<u8>, date_key: &str) -> AppResult<PublishedReport> {
        let file_name = report_file_name(self.quota.prefix(), date_key);
        let content_type = content_type_for(&file_name);
        let size = bytes.len();

        self.quota
            .put_with_recovery(self.storage.as_ref(), &file_name, bytes, &content_type)
            .await?;
        tracing::info!(key = %file_name, size, "Report uploaded");

        let url = self.storage.signed_url(&file_name, self.url_ttl).await?;

        // The path stored in the index is the object key, never the expiring URL
        let entry = self.index.upsert(date_key, &file_name, &file_name).await?;
        tracing::info!(date = %date_key, key = %file_name, "Report index updated");

        Ok(PublishedReport {
            file_name,
            url,
            entry,
        })
    }
}
