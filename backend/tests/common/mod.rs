//! In-memory collaborators for pipeline tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use cold_storage_backend::error::{AppError, AppResult};
use cold_storage_backend::external::{ObjectStorage, StorageError, StoredObject};
use cold_storage_backend::report::{LayoutVariant, RemarkPolicy, ReportLayout};
use cold_storage_backend::services::{
    Clock, ReportIndexStore, SnapshotService, SnapshotSettings, SnapshotStore, StockQuery,
};
use shared::{offset_from_hours, ActiveSelector, ReportIndexEntry, SnapshotRecord, StockItem};
use tokio::sync::Notify;
use uuid::Uuid;

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 2025-04-15 23:50 WIB
pub fn evening_run_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 15, 16, 50, 0).unwrap()
}

/// Applies the selector to a fixed set of items, like the database would
#[derive(Default)]
pub struct FakeStock {
    pub items: Vec<StockItem>,
    pub fail: Option<String>,
}

#[async_trait::async_trait]
impl StockQuery for FakeStock {
    async fn list_active(&self, selector: &ActiveSelector) -> AppResult<Vec<StockItem>> {
        if let Some(msg) = &self.fail {
            return Err(AppError::Internal(msg.clone()));
        }
        let mut selected: Vec<StockItem> = self
            .items
            .iter()
            .filter(|item| selector.matches(item))
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(selected)
    }
}

/// Keeps a run parked inside selection until `release` is notified
#[derive(Default)]
pub struct BlockingStock {
    pub items: Vec<StockItem>,
    /// Notified once selection has started
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait::async_trait]
impl StockQuery for BlockingStock {
    async fn list_active(&self, _selector: &ActiveSelector) -> AppResult<Vec<StockItem>> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.items.clone())
    }
}

#[derive(Default)]
pub struct FakeSnapshots {
    pub records: Mutex<Vec<SnapshotRecord>>,
    pub calls: Mutex<usize>,
    pub fail: Option<String>,
}

#[async_trait::async_trait]
impl SnapshotStore for FakeSnapshots {
    async fn insert_many(&self, records: &[SnapshotRecord]) -> AppResult<u64> {
        *self.calls.lock().unwrap() += 1;
        if let Some(msg) = &self.fail {
            return Err(AppError::Archive(msg.clone()));
        }
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(records.len() as u64)
    }
}

/// Bucket that can be told to reject uploads with given messages
#[derive(Default)]
pub struct FakeStorage {
    pub objects: Mutex<HashMap<String, (Vec<u8>, String, Option<DateTime<Utc>>)>>,
    /// Messages returned by successive `put` calls before uploads succeed
    pub put_failures: Mutex<Vec<String>>,
    pub put_calls: Mutex<usize>,
    pub delete_calls: Mutex<Vec<Vec<String>>>,
    pub signed: Mutex<Vec<(String, Duration)>>,
}

impl FakeStorage {
    pub fn with_put_failures(messages: &[&str]) -> Self {
        let storage = Self::default();
        *storage.put_failures.lock().unwrap() = messages.iter().map(|m| m.to_string()).collect();
        storage
    }

    pub fn seed(&self, key: &str, last_modified: DateTime<Utc>) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            (Vec::new(), "application/pdf".to_string(), Some(last_modified)),
        );
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl ObjectStorage for FakeStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        *self.put_calls.lock().unwrap() += 1;
        let mut failures = self.put_failures.lock().unwrap();
        if !failures.is_empty() {
            let message = failures.remove(0);
            return Err(StorageError::Upload {
                key: key.to_string(),
                message,
            });
        }
        self.objects.lock().unwrap().insert(
            key.to_string(),
            (bytes, content_type.to_string(), Some(Utc::now())),
        );
        Ok(())
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        self.signed.lock().unwrap().push((key.to_string(), ttl));
        Ok(format!(
            "https://bucket.example/{}?X-Amz-Expires={}",
            key,
            ttl.as_secs()
        ))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, (_, _, modified))| StoredObject {
                key: key.clone(),
                last_modified: *modified,
            })
            .collect())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), StorageError> {
        self.delete_calls.lock().unwrap().push(keys.to_vec());
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }
}

/// Report index keyed by date, like the unique constraint in the database
#[derive(Default)]
pub struct FakeIndex {
    pub entries: Mutex<HashMap<String, ReportIndexEntry>>,
}

#[async_trait::async_trait]
impl ReportIndexStore for FakeIndex {
    async fn upsert(&self, date: &str, file_name: &str, path: &str) -> AppResult<ReportIndexEntry> {
        let now = Utc::now();
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .entry(date.to_string())
            .and_modify(|e| {
                e.file_name = file_name.to_string();
                e.path = path.to_string();
                e.updated_at = now;
            })
            .or_insert_with(|| ReportIndexEntry {
                id: Uuid::new_v4(),
                date: date.to_string(),
                file_name: file_name.to_string(),
                path: path.to_string(),
                created_at: now,
                updated_at: now,
            });
        Ok(entry.clone())
    }
}

pub fn settings() -> SnapshotSettings {
    SnapshotSettings {
        offset: offset_from_hours(7),
        title: "STOK GLOBAL COLD STORAGE PSR BARU".to_string(),
        layout: ReportLayout::for_variant(LayoutVariant::Landscape),
        artifact_prefix: "report_".to_string(),
        retain_count: 60,
        url_ttl: Duration::from_secs(604_800),
        scheduled_remark: RemarkPolicy::StockOpname,
        on_demand_remark: RemarkPolicy::Blank,
    }
}

pub struct Harness {
    pub stock: Arc<FakeStock>,
    pub snapshots: Arc<FakeSnapshots>,
    pub storage: Arc<FakeStorage>,
    pub index: Arc<FakeIndex>,
    pub service: SnapshotService,
}

pub fn harness(stock: FakeStock, snapshots: FakeSnapshots, storage: FakeStorage) -> Harness {
    let stock = Arc::new(stock);
    let snapshots = Arc::new(snapshots);
    let storage = Arc::new(storage);
    let index = Arc::new(FakeIndex::default());

    let service = SnapshotService::new(
        stock.clone(),
        snapshots.clone(),
        storage.clone(),
        index.clone(),
        settings(),
    )
    .with_clock(Arc::new(FixedClock(evening_run_time())));

    Harness {
        stock,
        snapshots,
        storage,
        index,
        service,
    }
}

pub fn item(name: &str, weight: Option<&str>) -> StockItem {
    let mut item = StockItem::new(name, "1-2", "MC", "SJ-001");
    item.weight_kg = weight.map(str::to_string);
    item.container_count = Some("2".to_string());
    item.sack_count = Some("1".to_string());
    item.supplier_name = Some("CV Laut Biru".to_string());
    item
}
