//! Storage quota recovery tests
//!
//! A quota failure purges all but the newest reports in one batch and retries
//! the upload once; anything else fails straight through.

mod common;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use cold_storage_backend::error::AppError;
use cold_storage_backend::external::ObjectStorage;
use cold_storage_backend::services::{is_quota_message, QuotaRecoveryPolicy, RunOutcome};
use proptest::prelude::*;
use shared::RunTrigger;

use common::{harness, item, FakeSnapshots, FakeStock, FakeStorage};

fn seed_reports(storage: &FakeStorage, count: i64) {
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    for day in 0..count {
        let date = base + ChronoDuration::days(day);
        storage.seed(&format!("report_{}.pdf", date.format("%Y-%m-%d")), date);
    }
}

#[tokio::test]
async fn test_quota_failure_purges_and_retries_once() {
    let storage = FakeStorage::with_put_failures(&["Storage quota exceeded for this bucket"]);
    seed_reports(&storage, 70);
    storage.seed("photos/ikan.jpg", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

    let h = harness(
        FakeStock {
            items: vec![item("Tuna", Some("10"))],
            fail: None,
        },
        FakeSnapshots::default(),
        storage,
    );

    let outcome = h.service.run(RunTrigger::Scheduled).await.unwrap();
    assert!(matches!(outcome, RunOutcome::Published(_)));
    assert_eq!(*h.storage.put_calls.lock().unwrap(), 2);

    let deletes = h.storage.delete_calls.lock().unwrap();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].len(), 10);
    // The ten oldest go; nothing outside the prefix is touched
    assert!(deletes[0].contains(&"report_2025-01-01.pdf".to_string()));
    assert!(deletes[0].contains(&"report_2025-01-10.pdf".to_string()));
    assert!(!deletes[0].contains(&"report_2025-01-11.pdf".to_string()));
    assert!(!deletes[0].iter().any(|k| k.starts_with("photos/")));
    drop(deletes);

    let keys = h.storage.keys();
    assert!(keys.contains(&"photos/ikan.jpg".to_string()));
    assert!(keys.contains(&"report_2025-04-15.pdf".to_string()));
    assert_eq!(h.index.entries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_quota_failure_is_not_retried_again() {
    let storage = FakeStorage::with_put_failures(&[
        "InsufficientStorage: insufficient storage",
        "InsufficientStorage: insufficient storage",
    ]);
    seed_reports(&storage, 5);

    let h = harness(
        FakeStock {
            items: vec![item("Tuna", Some("10"))],
            fail: None,
        },
        FakeSnapshots::default(),
        storage,
    );

    let err = h.service.run(RunTrigger::Scheduled).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
    assert_eq!(*h.storage.put_calls.lock().unwrap(), 2);
    // Fewer than the retained count: nothing to delete
    assert!(h.storage.delete_calls.lock().unwrap().is_empty());
    assert!(h.index.entries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_purge_lists_by_prefix_and_keeps_newest() {
    let storage = FakeStorage::default();
    seed_reports(&storage, 3);
    let policy = QuotaRecoveryPolicy::new("report_", 1);

    let deleted = policy.purge(&storage).await.unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(storage.keys(), vec!["report_2025-01-03.pdf".to_string()]);

    let remaining = storage.list("report_").await.unwrap();
    assert_eq!(remaining.len(), 1);
}

proptest! {
    #[test]
    fn prop_quota_signals_match_case_insensitively(
        prefix in "[a-z ]{0,12}",
        suffix in "[a-z ]{0,12}",
        upper in any::<bool>(),
    ) {
        let message = format!("{}Storage Limit reached{}", prefix, suffix);
        let message = if upper { message.to_uppercase() } else { message };
        prop_assert!(is_quota_message(&message));
    }

    #[test]
    fn prop_purge_keeps_exactly_retain(count in 0usize..150, retain in 0usize..80) {
        let policy = QuotaRecoveryPolicy::new("report_", retain);
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let objects = (0..count)
            .map(|i| cold_storage_backend::external::StoredObject {
                key: format!("report_{:04}.pdf", i),
                last_modified: Some(base + ChronoDuration::hours(i as i64)),
            })
            .collect::<Vec<_>>();

        let doomed = policy.select_for_purge(objects);
        prop_assert_eq!(doomed.len(), count.saturating_sub(retain));
        // Every purged key is older than every kept one
        for key in &doomed {
            let n: usize = key[7..11].parse().unwrap();
            prop_assert!(n < count - retain.min(count));
        }
    }
}
