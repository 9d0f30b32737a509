//! Report index models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default object-key prefix for generated reports
pub const DEFAULT_REPORT_PREFIX: &str = "report_";

/// Maps a calendar date to the report generated for it. One entry per date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportIndexEntry {
    pub id: Uuid,
    /// `YYYY-MM-DD`, unique
    pub date: String,
    pub file_name: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report artifact name for a date key: `<prefix><YYYY-MM-DD>.pdf`
pub fn report_file_name(prefix: &str, date_key: &str) -> String {
    format!("{}{}.pdf", prefix, date_key)
}
