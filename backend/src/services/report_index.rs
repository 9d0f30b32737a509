//! Report index: one entry per date pointing at the published artifact

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{Pagination, ReportIndexEntry};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::stock::escape_like;
use crate::error::AppResult;

/// Write access to the report index
#[async_trait::async_trait]
pub trait ReportIndexStore: Send + Sync {
    /// Insert or replace the entry for `date`
    async fn upsert(&self, date: &str, file_name: &str, path: &str) -> AppResult<ReportIndexEntry>;
}

/// Filters for the report listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    /// Case-insensitive substring of the file name
    #[serde(default)]
    pub file_name: Option<String>,
}

/// One page of index entries, newest date first
#[derive(Debug, Clone)]
pub struct ReportPage {
    pub reports: Vec<ReportIndexEntry>,
    pub page: u32,
    pub limit: u32,
    pub total_records: u64,
    pub total_pages: u64,
}

#[derive(Debug, FromRow)]
struct ReportIndexRow {
    id: Uuid,
    date: String,
    file_name: String,
    path: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReportIndexRow> for ReportIndexEntry {
    fn from(row: ReportIndexRow) -> Self {
        ReportIndexEntry {
            id: row.id,
            date: row.date,
            file_name: row.file_name,
            path: row.path,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct ReportIndexService {
    db: PgPool,
}

impl ReportIndexService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Paginated listing, sorted by date descending
    pub async fn list(&self, query: &ReportListQuery) -> AppResult<ReportPage> {
        let pagination = query.pagination.normalized();
        let pattern = query
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM report_index WHERE ($1::TEXT IS NULL OR file_name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ReportIndexRow>(
            r#"
            SELECT id, date, file_name, path, created_at, updated_at
            FROM report_index
            WHERE ($1::TEXT IS NULL OR file_name ILIKE $1)
            ORDER BY date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        let total_records = u64::try_from(total).unwrap_or(0);
        Ok(ReportPage {
            reports: rows.into_iter().map(ReportIndexEntry::from).collect(),
            page: pagination.index,
            limit: pagination.limit,
            total_records,
            total_pages: pagination.total_pages(total_records),
        })
    }
}

#[async_trait::async_trait]
impl ReportIndexStore for ReportIndexService {
    async fn upsert(&self, date: &str, file_name: &str, path: &str) -> AppResult<ReportIndexEntry> {
        let row = sqlx::query_as::<_, ReportIndexRow>(
            r#"
            INSERT INTO report_index (id, date, file_name, path, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (date) DO UPDATE
                SET file_name = EXCLUDED.file_name,
                    path = EXCLUDED.path,
                    updated_at = NOW()
            RETURNING id, date, file_name, path, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(date)
        .bind(file_name)
        .bind(path)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }
}
