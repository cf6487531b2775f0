//! Contract Test: Persistence Across Restarts
//!
//! Verifies that the file store is what prevents re-announcements.
//!
//! Constraints verified:
//! - save(X), restart, load() yields X
//! - A restart with an unchanged address announces nothing
//! - A restart with a changed address announces once and persists it
//! - A failed announcement is not persisted and survives a restart as "pending"

mod common;

use common::*;
use ipwatch_core::error::NotifyError;
use ipwatch_core::traits::{AddressStore, ChannelId};
use ipwatch_core::{ChangeDetector, FileAddressStore};
use std::path::Path;
use tempfile::tempdir;
use tokio_test::assert_ok;

async fn detector_with_file(
    path: &Path,
    resolver: &ScriptedResolver,
    notifier: &RecordingNotifier,
) -> ChangeDetector {
    let store = FileAddressStore::open(path).await.expect("store opens");
    ChangeDetector::new(
        Box::new(resolver.clone()),
        Box::new(notifier.clone()),
        Box::new(store),
        ChannelId::new(CHANNEL),
    )
}

#[tokio::test]
async fn saved_address_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last_ip.txt");

    {
        let store = FileAddressStore::open(&path).await.unwrap();
        assert_ok!(store.save("203.0.113.5").await);
    }

    let store = FileAddressStore::open(&path).await.unwrap();
    assert_eq!(assert_ok!(store.load().await).as_deref(), Some("203.0.113.5"));
}

#[tokio::test]
async fn restart_with_same_address_announces_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last_ip.txt");
    let resolver = ScriptedResolver::fixed("192.0.2.10");

    // First run: announce and persist
    {
        let notifier = RecordingNotifier::new();
        let detector = detector_with_file(&path, &resolver, &notifier).await;
        let result = assert_ok!(detector.check_and_notify().await);
        assert!(result.changed);
        assert_eq!(notifier.sent_count(), 1);
    }

    // Second run: same address, nothing to announce
    {
        let notifier = RecordingNotifier::new();
        let detector = detector_with_file(&path, &resolver, &notifier).await;
        assert_eq!(detector.last_known().await.as_deref(), Some("192.0.2.10"));

        let result = assert_ok!(detector.check_and_notify().await);
        assert!(!result.changed);
        assert_eq!(notifier.attempt_count(), 0);
    }
}

#[tokio::test]
async fn restart_with_new_address_announces_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last_ip.txt");
    tokio::fs::write(&path, "192.0.2.10").await.unwrap();

    let resolver = ScriptedResolver::fixed("192.0.2.99");
    let notifier = RecordingNotifier::new();
    let detector = detector_with_file(&path, &resolver, &notifier).await;

    assert_ok!(detector.check_and_notify().await);
    assert_ok!(detector.check_and_notify().await);

    assert_eq!(notifier.sent_count(), 1);
    let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(on_disk.trim(), "192.0.2.99");
}

#[tokio::test]
async fn failed_announcement_is_still_pending_after_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("last_ip.txt");
    tokio::fs::write(&path, "192.0.2.10").await.unwrap();
    let resolver = ScriptedResolver::fixed("192.0.2.20");

    {
        let notifier = RecordingNotifier::new();
        notifier.fail_with(Some(NotifyError::DeliveryFailed("503".into())));
        let detector = detector_with_file(&path, &resolver, &notifier).await;
        assert!(detector.check_and_notify().await.is_err());
    }

    let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(on_disk.trim(), "192.0.2.10");

    let notifier = RecordingNotifier::new();
    let detector = detector_with_file(&path, &resolver, &notifier).await;
    let result = assert_ok!(detector.check_and_notify().await);
    assert!(result.changed);
    assert_eq!(notifier.sent_count(), 1);
}
