//! Common types used across the backend

use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};

/// Pagination parameters
///
/// Field names follow the legacy listing API (`index` is the 1-based page).
/// Legacy clients send numbers or numeric text; zero, negative or
/// unparseable values fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page", deserialize_with = "lenient_page")]
    pub index: u32,
    #[serde(default = "default_limit", deserialize_with = "lenient_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseNumber {
    fn positive(self) -> Option<u32> {
        let value = match self {
            LooseNumber::Int(n) => n,
            LooseNumber::Float(f) if f.is_finite() => f.trunc() as i64,
            LooseNumber::Text(text) => leading_integer(&text)?,
            LooseNumber::Float(_) | LooseNumber::Other(IgnoredAny) => return None,
        };
        (value > 0).then(|| u32::try_from(value).unwrap_or(u32::MAX))
    }
}

/// Integer prefix of `text` after leading whitespace, e.g. `" 12abc"` is 12
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let digits_from = usize::from(text.starts_with(['-', '+']));
    let end = text[digits_from..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text.len(), |i| i + digits_from);
    text[..end].parse().ok()
}

fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(LooseNumber::deserialize(deserializer)?
        .positive()
        .unwrap_or_else(default_page))
}

fn lenient_limit<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(LooseNumber::deserialize(deserializer)?
        .positive()
        .unwrap_or_else(default_limit))
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            index: default_page(),
            limit: default_limit(),
        }
    }
}

impl Pagination {
    /// Clamp to sane values: page and limit are at least 1, limit at most 100
    pub fn normalized(&self) -> Self {
        Self {
            index: self.index.max(1),
            limit: self.limit.clamp(1, 100),
        }
    }

    /// Row offset for the current page
    pub fn offset(&self) -> u64 {
        let p = self.normalized();
        u64::from(p.index - 1) * u64::from(p.limit)
    }

    /// Number of pages needed for `total` records
    pub fn total_pages(&self, total: u64) -> u64 {
        let limit = u64::from(self.normalized().limit);
        total.div_ceil(limit)
    }
}

/// Operation that triggered a snapshot run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunTrigger {
    Scheduled,
    OnDemand,
}

impl RunTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunTrigger::Scheduled => "scheduled",
            RunTrigger::OnDemand => "on_demand",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.index, 1);
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_accepts_numeric_text() {
        let p: Pagination = serde_json::from_str(r#"{"index": "2", "limit": " 5 "}"#).unwrap();
        assert_eq!((p.index, p.limit), (2, 5));

        let p: Pagination = serde_json::from_str(r#"{"index": "3rd", "limit": 7.9}"#).unwrap();
        assert_eq!((p.index, p.limit), (3, 7));
    }

    #[test]
    fn test_pagination_unusable_values_fall_back() {
        let p: Pagination =
            serde_json::from_str(r#"{"index": "abc", "limit": 0}"#).unwrap();
        assert_eq!((p.index, p.limit), (1, 10));

        let p: Pagination =
            serde_json::from_str(r#"{"index": null, "limit": "-4"}"#).unwrap();
        assert_eq!((p.index, p.limit), (1, 10));
    }

    #[test]
    fn test_pagination_offset_and_pages() {
        let p = Pagination { index: 3, limit: 10 };
        assert_eq!(p.offset(), 20);
        assert_eq!(p.total_pages(0), 0);
        assert_eq!(p.total_pages(21), 3);
        assert_eq!(p.total_pages(30), 3);
    }

    #[test]
    fn test_pagination_clamps_zero_values() {
        let p = Pagination { index: 0, limit: 0 }.normalized();
        assert_eq!(p.index, 1);
        assert_eq!(p.limit, 1);
    }
}
