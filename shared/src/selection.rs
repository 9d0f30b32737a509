//! Active-stock selection
//!
//! A stock item is "active today" when it has no deactivation timestamp, or
//! when it was deactivated during the current local day. Items depleted today
//! therefore still appear in today's snapshot (marked as sold out), and drop
//! out from tomorrow on.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{FormFactor, StockItem};

/// The `[00:00:00.000, 23:59:59.999]` window of one local calendar day, in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    day: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ActiveWindow {
    /// Window for the local day containing `now`
    pub fn for_day(now: DateTime<FixedOffset>) -> Self {
        let day = now.date_naive();
        let local_midnight = day.and_time(NaiveTime::MIN);
        let offset = Duration::seconds(i64::from(now.offset().local_minus_utc()));
        let start = Utc.from_utc_datetime(&(local_midnight - offset));
        let end = start + Duration::days(1) - Duration::milliseconds(1);

        Self { day, start, end }
    }

    /// Local calendar date the window covers
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last instant of the day (inclusive)
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Is an item with this deactivation timestamp still active today?
    pub fn is_active(&self, inactive_date: Option<DateTime<Utc>>) -> bool {
        match inactive_date {
            None => true,
            Some(at) => at >= self.start && at <= self.end,
        }
    }

    /// ISO date key (`YYYY-MM-DD`) used for report names and the report index
    pub fn date_key(&self) -> String {
        self.day.format("%Y-%m-%d").to_string()
    }
}

/// Optional narrowing applied on top of the active window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockFilter {
    pub form_factor: Option<FormFactor>,
    /// Case-insensitive substring of the item name
    pub name_contains: Option<String>,
}

impl StockFilter {
    /// Name needle, lowercased, or `None` if blank
    pub fn name_needle(&self) -> Option<String> {
        self.name_contains
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Predicate selecting the stock items that belong in a day's snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSelector {
    window: ActiveWindow,
    filter: StockFilter,
}

impl ActiveSelector {
    pub fn new(now: DateTime<FixedOffset>, filter: StockFilter) -> Self {
        Self {
            window: ActiveWindow::for_day(now),
            filter,
        }
    }

    pub fn window(&self) -> &ActiveWindow {
        &self.window
    }

    pub fn filter(&self) -> &StockFilter {
        &self.filter
    }

    pub fn matches(&self, item: &StockItem) -> bool {
        if !self.window.is_active(item.inactive_date) {
            return false;
        }
        if let Some(form) = self.filter.form_factor {
            if FormFactor::parse(&item.form_factor) != Some(form) {
                return false;
            }
        }
        match self.filter.name_needle() {
            Some(needle) => item.name.to_lowercase().contains(&needle),
            None => true,
        }
    }
}

/// Build a `FixedOffset` from whole hours east of UTC, falling back to UTC
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use proptest::prelude::*;

    fn wib() -> FixedOffset {
        offset_from_hours(7)
    }

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: u32) -> DateTime<FixedOffset> {
        wib()
            .with_ymd_and_hms(y, m, d, h, min, s)
            .single()
            .unwrap()
            .with_nanosecond(ms * 1_000_000)
            .unwrap()
    }

    fn item(name: &str, form: &str, inactive: Option<DateTime<Utc>>) -> StockItem {
        let mut item = StockItem::new(name, "5-7", form, "SJ-001");
        item.inactive_date = inactive;
        item
    }

    #[test]
    fn test_window_bounds_in_local_time() {
        let window = ActiveWindow::for_day(local(2025, 4, 15, 13, 30, 0, 0));
        assert_eq!(window.date_key(), "2025-04-15");
        assert_eq!(window.start(), local(2025, 4, 15, 0, 0, 0, 0).with_timezone(&Utc));
        assert_eq!(window.end(), local(2025, 4, 15, 23, 59, 59, 999).with_timezone(&Utc));
    }

    #[test]
    fn test_absent_deactivation_is_active() {
        let window = ActiveWindow::for_day(local(2025, 4, 15, 8, 0, 0, 0));
        assert!(window.is_active(None));
    }

    #[test]
    fn test_boundaries() {
        let window = ActiveWindow::for_day(local(2025, 4, 15, 8, 0, 0, 0));
        let at = |dt: DateTime<FixedOffset>| Some(dt.with_timezone(&Utc));

        assert!(window.is_active(at(local(2025, 4, 15, 0, 0, 0, 0))));
        assert!(window.is_active(at(local(2025, 4, 15, 23, 59, 59, 999))));
        assert!(!window.is_active(at(local(2025, 4, 16, 0, 0, 0, 0))));
        assert!(!window.is_active(at(local(2025, 4, 14, 23, 59, 59, 999))));
    }

    #[test]
    fn test_selector_narrowing() {
        let now = local(2025, 4, 15, 8, 0, 0, 0);
        let by_form = ActiveSelector::new(
            now,
            StockFilter {
                form_factor: Some(FormFactor::Sack),
                name_contains: None,
            },
        );
        assert!(by_form.matches(&item("Tongkol", "KRG", None)));
        assert!(!by_form.matches(&item("Tongkol", "MC", None)));

        let by_name = ActiveSelector::new(
            now,
            StockFilter {
                form_factor: None,
                name_contains: Some("kakap".to_string()),
            },
        );
        assert!(by_name.matches(&item("Kakap Merah", "MC", None)));
        assert!(by_name.matches(&item("IKAN KAKAP", "MC", None)));
        assert!(!by_name.matches(&item("Tenggiri", "MC", None)));
    }

    #[test]
    fn test_selector_excludes_items_deactivated_yesterday() {
        let now = local(2025, 4, 15, 8, 0, 0, 0);
        let selector = ActiveSelector::new(now, StockFilter::default());
        let yesterday = local(2025, 4, 14, 18, 0, 0, 0).with_timezone(&Utc);
        assert!(!selector.matches(&item("Tongkol", "MC", Some(yesterday))));
    }

    proptest! {
        /// Membership holds exactly for timestamps inside the local day
        #[test]
        fn prop_active_iff_within_day(
            hour in 0u32..24,
            offset_ms in -172_800_000i64..172_800_000i64,
        ) {
            let now = local(2025, 4, 15, hour, 0, 0, 0);
            let window = ActiveWindow::for_day(now);
            let midnight = local(2025, 4, 15, 0, 0, 0, 0).with_timezone(&Utc);
            let at = midnight + Duration::milliseconds(offset_ms);

            let expected = (0..86_400_000).contains(&offset_ms);
            prop_assert_eq!(window.is_active(Some(at)), expected);
        }
    }
}
