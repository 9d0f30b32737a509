//! Storage quota recovery
//!
//! When an upload fails because the bucket is full, old report artifacts are
//! purged (keeping the newest ones) and the upload is retried exactly once.

use std::cmp::Reverse;

use crate::external::{ObjectStorage, StorageError, StoredObject};

/// Substrings that mark a provider error as a capacity/quota failure
pub const QUOTA_SIGNALS: [&str; 5] = [
    "quota",
    "storage limit",
    "storage full",
    "insufficient storage",
    "no space left",
];

/// Whether a provider message signals exhausted capacity
pub fn is_quota_message(message: &str) -> bool {
    let message = message.to_lowercase();
    QUOTA_SIGNALS.iter().any(|signal| message.contains(signal))
}

#[derive(Debug, Clone)]
pub struct QuotaRecoveryPolicy {
    prefix: String,
    retain: usize,
}

impl QuotaRecoveryPolicy {
    pub fn new(prefix: impl Into<String>, retain: usize) -> Self {
        Self {
            prefix: prefix.into(),
            retain,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Only the provider's message counts; keys and prefixes are ignored
    pub fn is_quota_error(&self, err: &StorageError) -> bool {
        is_quota_message(err.message())
    }

    /// Keys to delete: everything after the `retain` newest objects.
    /// Objects without a timestamp count as oldest; ties break on key.
    pub fn select_for_purge(&self, mut objects: Vec<StoredObject>) -> Vec<String> {
        objects.sort_by_key(|o| Reverse((o.last_modified, o.key.clone())));
        objects
            .into_iter()
            .skip(self.retain)
            .map(|o| o.key)
            .collect()
    }

    /// Delete old artifacts under the prefix in a single batch.
    /// Returns how many keys were removed.
    pub async fn purge(&self, storage: &dyn ObjectStorage) -> Result<usize, StorageError> {
        let objects = storage.list(&self.prefix).await?;
        let listed = objects.len();
        let doomed = self.select_for_purge(objects);

        if doomed.is_empty() {
            tracing::info!(prefix = %self.prefix, listed, "No old reports to purge");
            return Ok(0);
        }

        storage.delete_many(&doomed).await?;
        tracing::info!(
            prefix = %self.prefix,
            listed,
            deleted = doomed.len(),
            retained = listed - doomed.len(),
            "Purged old reports"
        );
        Ok(doomed.len())
    }

    /// Upload, purging and retrying once if the first attempt hits the quota.
    /// Non-quota failures and a failed retry are returned unchanged.
    pub async fn put_with_recovery(
        &self,
        storage: &dyn ObjectStorage,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let err = match storage.put(key, bytes.clone(), content_type).await {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        if !self.is_quota_error(&err) {
            return Err(err);
        }

        tracing::warn!(key, error = %err, "Storage quota reached, purging old reports");
        if let Err(purge_err) = self.purge(storage).await {
            tracing::error!(error = %purge_err, "Purge of old reports failed");
            return Err(err);
        }

        storage.put(key, bytes, content_type).await
    }
}
