//! Tests for `snapshot` module

use super::*;
use tempfile::tempdir;

#[test]
fn invariant_6_persisted_pair_round_trips() {
    let dir = tempdir().unwrap();
    let snap = Snapshot::new(dir.path().join("snap.db"), false);

    snap.snapshot([SnapshotEntry { key: "k", value: "v", ttl: None }]).unwrap();

    let loaded = snap.load().unwrap();
    assert_eq!(loaded.get("k").unwrap().value, "v");
}

#[test]
fn load_on_missing_file_returns_empty() {
    let dir = tempdir().unwrap();
    let snap = Snapshot::new(dir.path().join("nonexistent.db"), false);
    assert!(snap.load().unwrap().is_empty());
}

#[test]
fn two_field_form_does_not_carry_ttl() {
    let dir = tempdir().unwrap();
    let snap = Snapshot::new(dir.path().join("snap.db"), false);
    snap.snapshot([SnapshotEntry { key: "k", value: "v", ttl: None }]).unwrap();

    let loaded = snap.load().unwrap();
    assert_eq!(loaded.get("k").unwrap().ttl, None);
}

#[test]
fn three_field_form_round_trips_ttl_when_enabled() {
    let dir = tempdir().unwrap();
    let snap = Snapshot::new(dir.path().join("snap.db"), true);
    snap.snapshot([SnapshotEntry { key: "k", value: "v", ttl: Some(Duration::from_millis(5000)) }])
        .unwrap();

    let loaded = snap.load().unwrap();
    let entry = loaded.get("k").unwrap();
    assert_eq!(entry.value, "v");
    assert_eq!(entry.ttl, Some(Duration::from_millis(5000)));
}

#[test]
fn snapshot_escapes_whitespace_in_keys_and_values() {
    let dir = tempdir().unwrap();
    let snap = Snapshot::new(dir.path().join("snap.db"), false);
    snap.snapshot([SnapshotEntry { key: "key with spaces", value: "value\nwith\nnewlines", ttl: None }])
        .unwrap();

    let loaded = snap.load().unwrap();
    assert_eq!(loaded.get("key with spaces").unwrap().value, "value\nwith\nnewlines");
}

#[test]
fn snapshot_replaces_previous_contents_atomically() {
    let dir = tempdir().unwrap();
    let snap = Snapshot::new(dir.path().join("snap.db"), false);
    snap.snapshot([SnapshotEntry { key: "a", value: "1", ttl: None }]).unwrap();
    snap.snapshot([SnapshotEntry { key: "b", value: "2", ttl: None }]).unwrap();

    let loaded = snap.load().unwrap();
    assert!(!loaded.contains_key("a"));
    assert_eq!(loaded.get("b").unwrap().value, "2");
}

#[tokio::test]
async fn async_snapshot_eventually_lands_on_disk() {
    let dir = tempdir().unwrap();
    let snap = std::sync::Arc::new(Snapshot::new(dir.path().join("snap.db"), false));
    let path = dir.path().join("snap.db");

    Snapshot::async_snapshot(snap, vec![("k".to_string(), "v".to_string(), None)]);

    // Poll briefly: spawn_blocking scheduling is not instantaneous.
    for _ in 0..50 {
        if path.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let snap = Snapshot::new(path, false);
    let loaded = snap.load().unwrap();
    assert_eq!(loaded.get("k").unwrap().value, "v");
}
