//! Stock movement log models
//!
//! Movement logs are append-only: one record per stock mutation, never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StockItem;

/// State transition recorded by a movement log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementStatus {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
    #[serde(rename = "UPDATE BY ADMIN")]
    UpdateByAdmin,
    #[serde(rename = "DELETE BY ADMIN")]
    DeleteByAdmin,
}

impl MovementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementStatus::In => "IN",
            MovementStatus::Out => "OUT",
            MovementStatus::UpdateByAdmin => "UPDATE BY ADMIN",
            MovementStatus::DeleteByAdmin => "DELETE BY ADMIN",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "IN" => Some(MovementStatus::In),
            "OUT" => Some(MovementStatus::Out),
            "UPDATE BY ADMIN" => Some(MovementStatus::UpdateByAdmin),
            "DELETE BY ADMIN" => Some(MovementStatus::DeleteByAdmin),
            _ => None,
        }
    }
}

/// Immutable record of one stock item mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovementLog {
    pub id: Uuid,
    /// Item the log was written for; kept as a weak reference since items can be deleted
    pub stock_item_id: Option<Uuid>,
    pub name: String,
    pub size: String,
    pub supplier_id: Option<Uuid>,
    pub form_factor: String,
    pub weight_before: Option<String>,
    pub weight_after: Option<String>,
    pub container_before: Option<String>,
    pub container_after: Option<String>,
    pub buy_price: Option<String>,
    pub sell_price: Option<String>,
    pub payment_amount: Option<String>,
    pub transport_note: Option<String>,
    pub status: MovementStatus,
    pub created_at: DateTime<Utc>,
}

impl MovementLog {
    /// Log describing `item` in its current state; before-values are left for the caller
    pub fn for_item(item: &StockItem, status: MovementStatus, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            stock_item_id: Some(item.id),
            name: item.name.clone(),
            size: item.size.clone(),
            supplier_id: item.supplier_id,
            form_factor: item.form_factor.clone(),
            weight_before: None,
            weight_after: item.weight_kg.clone(),
            container_before: None,
            container_after: item.container_count.clone(),
            buy_price: item.buy_price.clone(),
            sell_price: item.sell_price.clone(),
            payment_amount: None,
            transport_note: None,
            status,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_serde() {
        for status in [
            MovementStatus::In,
            MovementStatus::Out,
            MovementStatus::UpdateByAdmin,
            MovementStatus::DeleteByAdmin,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(MovementStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MovementStatus::parse("out"), None);
    }
}
