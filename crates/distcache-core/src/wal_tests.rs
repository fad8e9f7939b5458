//! Tests for `wal` module

use super::*;
use tempfile::tempdir;

#[test]
fn invariant_5_replay_reproduces_append_order() {
    let dir = tempdir().unwrap();
    let wal = Wal::open(dir.path().join("test.wal")).unwrap();

    wal.append(Op::Set, "x", Some("1")).unwrap();
    wal.append(Op::Set, "y", Some("2")).unwrap();
    wal.append(Op::Del, "x", None).unwrap();

    let records = wal.replay().unwrap();
    assert_eq!(
        records,
        vec![
            Record { op: Op::Set, key: "x".into(), value: "1".into() },
            Record { op: Op::Set, key: "y".into(), value: "2".into() },
            Record { op: Op::Del, key: "x".into(), value: String::new() },
        ]
    );
}

#[test]
fn replay_on_missing_file_returns_empty() {
    let dir = tempdir().unwrap();
    let wal = Wal::open(dir.path().join("nonexistent.wal")).unwrap();
    assert_eq!(wal.replay().unwrap(), Vec::new());
}

#[test]
fn replay_drops_trailing_malformed_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let wal = Wal::open(&path).unwrap();
    wal.append(Op::Set, "a", Some("1")).unwrap();
    // Simulate a crash mid-write: append a partial record directly.
    {
        use std::io::Write;
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        write!(f, "SET partial_ke").unwrap();
    }

    let records = wal.replay().unwrap();
    assert_eq!(records, vec![Record { op: Op::Set, key: "a".into(), value: "1".into() }]);
}

#[test]
fn round_trips_keys_and_values_with_whitespace() {
    let dir = tempdir().unwrap();
    let wal = Wal::open(dir.path().join("test.wal")).unwrap();
    wal.append(Op::Set, "key with spaces", Some("value\nwith\tnewline")).unwrap();

    let records = wal.replay().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "key with spaces");
    assert_eq!(records[0].value, "value\nwith\tnewline");
}

#[test]
fn truncate_empties_the_log() {
    let dir = tempdir().unwrap();
    let wal = Wal::open(dir.path().join("test.wal")).unwrap();
    wal.append(Op::Set, "a", Some("1")).unwrap();
    wal.truncate().unwrap();

    assert_eq!(wal.replay().unwrap(), Vec::new());

    wal.append(Op::Set, "b", Some("2")).unwrap();
    assert_eq!(
        wal.replay().unwrap(),
        vec![Record { op: Op::Set, key: "b".into(), value: "2".into() }]
    );
}

#[test]
fn group_commit_batches_flushes_within_window() {
    let dir = tempdir().unwrap();
    let wal = Wal::with_durability(
        dir.path().join("test.wal"),
        Durability::GroupCommit { window: Duration::from_millis(20) },
    )
    .unwrap();

    wal.append(Op::Set, "a", Some("1")).unwrap();
    wal.sync().unwrap();

    assert_eq!(
        wal.replay().unwrap(),
        vec![Record { op: Op::Set, key: "a".into(), value: "1".into() }]
    );
}

#[test]
fn group_commit_append_does_not_return_before_its_batch_is_flushed() {
    use std::sync::Arc;
    use std::thread;

    let dir = tempdir().unwrap();
    let wal = Arc::new(
        Wal::with_durability(
            dir.path().join("test.wal"),
            Durability::GroupCommit { window: Duration::from_millis(50) },
        )
        .unwrap(),
    );

    // Two appends joining the same batch: both must observe the batch as
    // flushed to disk by the time their `append` call returns, even though
    // neither of them called `sync`.
    let w1 = Arc::clone(&wal);
    let t1 = thread::spawn(move || w1.append(Op::Set, "a", Some("1")).unwrap());
    thread::sleep(Duration::from_millis(5));
    let w2 = Arc::clone(&wal);
    let t2 = thread::spawn(move || w2.append(Op::Set, "b", Some("2")).unwrap());

    t1.join().unwrap();
    t2.join().unwrap();

    let mut records = wal.replay().unwrap();
    records.sort_by(|a, b| a.key.cmp(&b.key));
    assert_eq!(
        records,
        vec![
            Record { op: Op::Set, key: "a".into(), value: "1".into() },
            Record { op: Op::Set, key: "b".into(), value: "2".into() },
        ]
    );
}

#[test]
fn pending_ops_tracks_appends_and_resets_on_truncate() {
    let dir = tempdir().unwrap();
    let wal = Wal::open(dir.path().join("test.wal")).unwrap();
    assert_eq!(wal.pending_ops(), 0);

    wal.append(Op::Set, "a", Some("1")).unwrap();
    wal.append(Op::Set, "b", Some("2")).unwrap();
    assert_eq!(wal.pending_ops(), 2);

    wal.truncate().unwrap();
    assert_eq!(wal.pending_ops(), 0);

    wal.append(Op::Del, "a", None).unwrap();
    assert_eq!(wal.pending_ops(), 1);
}
