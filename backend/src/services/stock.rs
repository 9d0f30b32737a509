//! Stock query service: active stock items joined with supplier data

use chrono::{DateTime, Utc};
use shared::{ActiveSelector, StockItem};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::AppResult;

/// Read access to stock items for the snapshot pipeline
#[async_trait::async_trait]
pub trait StockQuery: Send + Sync {
    /// Items matching `selector`, joined with supplier names, ordered by name
    async fn list_active(&self, selector: &ActiveSelector) -> AppResult<Vec<StockItem>>;
}

/// PostgreSQL-backed stock queries
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Row for the active stock query
#[derive(Debug, FromRow)]
struct StockItemRow {
    id: Uuid,
    name: String,
    photo: Option<String>,
    size: String,
    supplier_id: Option<Uuid>,
    supplier_name: Option<String>,
    form_factor: String,
    transport_note: String,
    mc_setting: Option<String>,
    weight_kg: Option<String>,
    container_count: Option<String>,
    sack_count: Option<String>,
    buy_price: Option<String>,
    sell_price: Option<String>,
    inactive_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockItemRow> for StockItem {
    fn from(row: StockItemRow) -> Self {
        StockItem {
            id: row.id,
            name: row.name,
            photo: row.photo,
            size: row.size,
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
            form_factor: row.form_factor,
            transport_note: row.transport_note,
            mc_setting: row.mc_setting,
            weight_kg: row.weight_kg,
            container_count: row.container_count,
            sack_count: row.sack_count,
            buy_price: row.buy_price,
            sell_price: row.sell_price,
            inactive_date: row.inactive_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Escape LIKE wildcards so user input matches literally
pub(crate) fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl StockQuery for StockService {
    async fn list_active(&self, selector: &ActiveSelector) -> AppResult<Vec<StockItem>> {
        let window = selector.window();
        let form_factor = selector.filter().form_factor.map(|f| f.as_str());
        let name_pattern = selector
            .filter()
            .name_needle()
            .map(|needle| format!("%{}%", escape_like(&needle)));

        let rows = sqlx::query_as::<_, StockItemRow>(
            r#"
            SELECT
                e.id, e.name, e.photo, e.size, e.supplier_id,
                s.name AS supplier_name,
                e.form_factor, e.transport_note, e.mc_setting,
                e.weight_kg, e.container_count, e.sack_count,
                e.buy_price, e.sell_price,
                e.inactive_date, e.created_at, e.updated_at
            FROM stock_items e
            LEFT JOIN suppliers s ON s.id = e.supplier_id
            WHERE (e.inactive_date IS NULL OR e.inactive_date BETWEEN $1 AND $2)
              AND ($3::TEXT IS NULL OR UPPER(TRIM(e.form_factor)) = $3)
              AND ($4::TEXT IS NULL OR e.name ILIKE $4)
            ORDER BY e.name ASC
            "#,
        )
        .bind(window.start())
        .bind(window.end())
        .bind(form_factor)
        .bind(name_pattern)
        .fetch_all(&self.db)
        .await?;

        tracing::debug!(
            date = %window.date_key(),
            count = rows.len(),
            "Selected active stock items"
        );

        Ok(rows.into_iter().map(StockItem::from).collect())
    }
}
