//! Supplier models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vendor a stock lot was bought from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    /// Display name used in reports; unknown suppliers render as `-`
    pub fn display_name(name: Option<&str>) -> &str {
        match name.map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => "-",
        }
    }
}
