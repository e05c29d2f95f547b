//! Integration tests for the full block/unblock cycle.
//!
//! These tests run the store over an on-disk SQLite database and check that
//! every transition survives a reopen.

use chrono::{Duration, Utc};
use focusgate_core::storage::SqliteBackend;
use focusgate_core::{
    CoreError, Event, SiteRecord, SiteState, SiteStore, StoreError, TimeUnit, Verdict,
};

fn open(path: &std::path::Path) -> SiteStore {
    SiteStore::new(Box::new(
        SqliteBackend::open_at(path.to_path_buf()).unwrap(),
    ))
}

#[test]
fn test_block_release_cycle_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusgate.db");
    let t0 = Utc::now();

    let store = open(&path);
    store
        .add(SiteRecord::with_units(
            "www.youtube.com",
            (10, TimeUnit::Seconds),
            (5, TimeUnit::Seconds),
            t0,
        ))
        .unwrap();

    // Ten one-second ticks cross the threshold on the last one.
    let mut blocked_on = None;
    for i in 1..=10 {
        let outcome = store
            .tick("https://www.youtube.com/watch?v=x", 1_000, t0 + Duration::seconds(i))
            .unwrap();
        if outcome.changed() {
            blocked_on = Some(i);
        }
    }
    assert_eq!(blocked_on, Some(10));

    // Reopen: the block is on disk.
    drop(store);
    let store = open(&path);
    let record = &store.get_all().unwrap()[0];
    assert_eq!(record.state(), SiteState::Blocked);
    assert_eq!(record.time_spent_ms, 10_000);
    assert!(store.is_blocked("https://youtube.com/").unwrap());

    // More foreground time while blocked is not counted.
    store
        .tick("https://youtube.com", 2_000, t0 + Duration::seconds(12))
        .unwrap();
    assert_eq!(store.get_all().unwrap()[0].time_spent_ms, 10_000);

    // Five seconds after blocking the cool-down is over.
    let outcome = store
        .tick("https://youtube.com", 1_000, t0 + Duration::seconds(15))
        .unwrap();
    assert!(matches!(outcome.events[0], Event::SiteReleased { .. }));

    drop(store);
    let store = open(&path);
    let record = &store.get_all().unwrap()[0];
    assert!(!record.blocked);
    assert!(record.blocked_at.is_none());
    assert_eq!(record.time_spent_ms, 0);
}

#[test]
fn test_justified_unblock() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir.path().join("focusgate.db"));
    let t0 = Utc::now();

    store
        .add(SiteRecord::with_units(
            "reddit.com",
            (1, TimeUnit::Minutes),
            (30, TimeUnit::Minutes),
            t0,
        ))
        .unwrap();
    store
        .tick("https://reddit.com/r/rust", 60_000, t0)
        .unwrap();
    assert!(store.is_blocked("reddit.com").unwrap());

    assert_eq!(
        store.justify("reddit.com", "xyz", t0).unwrap(),
        Verdict::Rejected(focusgate_core::Rejection::Unconvinced)
    );
    assert!(store.is_blocked("reddit.com").unwrap());

    assert_eq!(
        store
            .justify("reddit.com", "Urgent question for my university project", t0)
            .unwrap(),
        Verdict::Accepted
    );
    assert!(!store.is_blocked("reddit.com").unwrap());
}

#[test]
fn test_add_and_remove_edge_cases() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir.path().join("focusgate.db"));
    let t0 = Utc::now();

    store.add(SiteRecord::new("example.com", 10, 5, t0)).unwrap();
    let dup = store
        .add(SiteRecord::new("www.example.com", 10, 5, t0))
        .unwrap_err();
    assert!(matches!(
        dup,
        CoreError::Store(StoreError::DuplicateDomain { .. })
    ));

    let empty = store.add(SiteRecord::new("", 10, 5, t0)).unwrap_err();
    assert!(matches!(
        empty,
        CoreError::Store(StoreError::InvalidInput { .. })
    ));

    assert!(matches!(
        store.remove(5, t0).unwrap_err(),
        CoreError::Store(StoreError::IndexOutOfRange { index: 5, len: 1 })
    ));

    store.remove(0, t0).unwrap();
    assert!(store.get_all().unwrap().is_empty());
}

#[test]
fn test_invalid_url_never_tracks() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir.path().join("focusgate.db"));
    let t0 = Utc::now();

    store.add(SiteRecord::new("example.com", 1, 5, t0)).unwrap();
    let outcome = store.tick("not a url", 60_000, t0).unwrap();
    assert_eq!(outcome.matched, 0);
    assert_eq!(store.get_all().unwrap()[0].time_spent_ms, 0);
}

#[test]
fn test_statuses_for_list_view() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir.path().join("focusgate.db"));
    let t0 = Utc::now();

    store.add(SiteRecord::new("a.com", 60, 120, t0)).unwrap();
    store.add(SiteRecord::new("b.com", 10, 120, t0)).unwrap();
    store.tick("a.com", 15_000, t0).unwrap();
    store.tick("b.com", 10_000, t0).unwrap();

    let statuses = store.statuses(t0 + Duration::seconds(45)).unwrap();
    assert_eq!(statuses[0].state, SiteState::Active);
    assert_eq!(statuses[0].label(), "15s");
    assert_eq!(statuses[0].progress(), 0.25);
    assert_eq!(statuses[1].state, SiteState::Blocked);
    assert_eq!(statuses[1].label(), "1m 15s");
}
