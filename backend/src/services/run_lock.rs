//! Per-date run lock: at most one snapshot run per local date at a time

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

#[derive(Debug, Clone, Default)]
pub struct DailyRunLock {
    held: Arc<Mutex<HashSet<NaiveDate>>>,
}

/// Releases the date when dropped
#[derive(Debug)]
pub struct RunGuard {
    held: Arc<Mutex<HashSet<NaiveDate>>>,
    date: NaiveDate,
}

fn lock(held: &Mutex<HashSet<NaiveDate>>) -> MutexGuard<'_, HashSet<NaiveDate>> {
    // A panic while holding the set cannot leave it inconsistent
    held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DailyRunLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `date`; `None` if a run for it is already in progress
    pub fn try_acquire(&self, date: NaiveDate) -> Option<RunGuard> {
        if !lock(&self.held).insert(date) {
            return None;
        }
        Some(RunGuard {
            held: Arc::clone(&self.held),
            date,
        })
    }

    pub fn is_held(&self, date: NaiveDate) -> bool {
        lock(&self.held).contains(&date)
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        lock(&self.held).remove(&self.date);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_for_same_date_fails() {
        let lock = DailyRunLock::new();
        let day = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
        let other = NaiveDate::from_ymd_opt(2025, 4, 16).unwrap();

        let guard = lock.try_acquire(day).unwrap();
        assert!(lock.try_acquire(day).is_none());
        assert!(lock.try_acquire(other).is_some());
        assert!(lock.is_held(day));

        drop(guard);
        assert!(!lock.is_held(day));
        assert!(lock.try_acquire(day).is_some());
    }
}
