//! Snapshot archiver: append-only copies of the day's active stock

use chrono::{DateTime, Utc};
use shared::{SnapshotRecord, StockItem};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;

use crate::error::{AppError, AppResult};

/// Rows per INSERT statement, well below the PostgreSQL bind-parameter limit
const INSERT_CHUNK: usize = 1000;

/// Persistence for snapshot records
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Insert all records as one unit; returns the number written
    async fn insert_many(&self, records: &[SnapshotRecord]) -> AppResult<u64>;
}

/// Outcome of an archive step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Nothing was selected; the run stops here
    NothingToDo,
    Archived(usize),
}

/// Copies selected stock items into the snapshot history
#[derive(Clone)]
pub struct SnapshotArchiver {
    store: Arc<dyn SnapshotStore>,
}

impl SnapshotArchiver {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    pub async fn archive(
        &self,
        items: &[StockItem],
        backup_date: DateTime<Utc>,
    ) -> AppResult<ArchiveOutcome> {
        if items.is_empty() {
            return Ok(ArchiveOutcome::NothingToDo);
        }

        let records: Vec<SnapshotRecord> = items
            .iter()
            .map(|item| SnapshotRecord::from_item(item, backup_date))
            .collect();

        self.store.insert_many(&records).await.map_err(|e| match e {
            AppError::DatabaseError(err) => AppError::Archive(err.to_string()),
            other => other,
        })?;

        Ok(ArchiveOutcome::Archived(records.len()))
    }
}

/// PostgreSQL snapshot table
#[derive(Clone)]
pub struct PgSnapshotStore {
    db: PgPool,
}

impl PgSnapshotStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn insert_many(&self, records: &[SnapshotRecord]) -> AppResult<u64> {
        let mut tx = self.db.begin().await?;
        let mut written = 0;

        for chunk in records.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO stock_snapshots (
                    name, photo, size, supplier_id, supplier_name, form_factor,
                    transport_note, mc_setting, weight_kg, container_count, sack_count,
                    buy_price, sell_price, inactive_date, created_at, updated_at, backup_date
                ) "#,
            );

            builder.push_values(chunk, |mut row, r| {
                row.push_bind(r.name.clone())
                    .push_bind(r.photo.clone())
                    .push_bind(r.size.clone())
                    .push_bind(r.supplier_id)
                    .push_bind(r.supplier_name.clone())
                    .push_bind(r.form_factor.clone())
                    .push_bind(r.transport_note.clone())
                    .push_bind(r.mc_setting.clone())
                    .push_bind(r.weight_kg.clone())
                    .push_bind(r.container_count.clone())
                    .push_bind(r.sack_count.clone())
                    .push_bind(r.buy_price.clone())
                    .push_bind(r.sell_price.clone())
                    .push_bind(r.inactive_date)
                    .push_bind(r.created_at)
                    .push_bind(r.updated_at)
                    .push_bind(r.backup_date);
            });

            written += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }
}
