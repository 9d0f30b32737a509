//! Snapshot (backup) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StockItem;

/// Point-in-time copy of an active stock item, written once per report run.
///
/// Carries every item field except the item's own id, with the supplier
/// name denormalized so the record stays readable after supplier edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotRecord {
    pub name: String,
    pub photo: Option<String>,
    pub size: String,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    pub form_factor: String,
    pub transport_note: String,
    pub mc_setting: Option<String>,
    pub weight_kg: Option<String>,
    pub container_count: Option<String>,
    pub sack_count: Option<String>,
    pub buy_price: String,
    pub sell_price: String,
    pub inactive_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub backup_date: DateTime<Utc>,
}

impl SnapshotRecord {
    pub fn from_item(item: &StockItem, backup_date: DateTime<Utc>) -> Self {
        Self {
            name: item.name.clone(),
            photo: item.photo.clone(),
            size: item.size.clone(),
            supplier_id: item.supplier_id,
            supplier_name: item.supplier_name.clone(),
            form_factor: item.form_factor.clone(),
            transport_note: item.transport_note.clone(),
            mc_setting: item.mc_setting.clone(),
            weight_kg: item.weight_kg.clone(),
            container_count: item.container_count.clone(),
            sack_count: item.sack_count.clone(),
            buy_price: price_or_zero(item.buy_price.as_deref()),
            sell_price: price_or_zero(item.sell_price.as_deref()),
            inactive_date: item.inactive_date,
            created_at: item.created_at,
            updated_at: item.updated_at,
            backup_date,
        }
    }
}

fn price_or_zero(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => "0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_item_fields() {
        let mut item = StockItem::new("Kembung", "8-10", "KRG", "SJ-22");
        item.supplier_name = Some("UD Bahari".to_string());
        item.weight_kg = Some("42.5".to_string());
        item.sell_price = Some("38000".to_string());
        let backup_date = Utc::now();

        let record = SnapshotRecord::from_item(&item, backup_date);

        assert_eq!(record.name, "Kembung");
        assert_eq!(record.supplier_name.as_deref(), Some("UD Bahari"));
        assert_eq!(record.weight_kg.as_deref(), Some("42.5"));
        assert_eq!(record.created_at, item.created_at);
        assert_eq!(record.backup_date, backup_date);
        assert_eq!(record.buy_price, "0");
        assert_eq!(record.sell_price, "38000");
    }
}
