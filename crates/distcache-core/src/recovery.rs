//! Recovery orchestrator: snapshot-load then WAL-replay, in that order,
//! rebuilding the pre-crash cache state.
//!
//! `state(load(snapshot)) ⊕ replay(wal_since_snapshot) = state at crash`.
//! The WAL is never truncated here — only a subsequent, successfully
//! fsynced snapshot earns that.

use std::time::Duration;

use crate::cache::LruCache;
use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::wal::{Op, Wal};

/// Outcome of a single recovery pass, useful for startup logging.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryReport {
    /// Entries restored from the snapshot file.
    pub loaded_from_snapshot: usize,
    /// Records replayed from the WAL (SET and DEL combined).
    pub replayed_from_wal: usize,
}

/// Loads `snapshot` into `cache`, then replays `wal` on top of it in
/// append order. Entries loaded from the snapshot without a persisted
/// TTL receive `default_ttl`.
///
/// # Errors
///
/// Returns an error if the snapshot or WAL file exists but cannot be
/// read. A malformed trailing WAL record is dropped silently by
/// [`Wal::replay`], not treated as an error here.
pub fn recover(
    cache: &LruCache<String, String>,
    wal: &Wal,
    snapshot: &Snapshot,
    default_ttl: Duration,
) -> Result<RecoveryReport> {
    let loaded = snapshot.load()?;
    let loaded_from_snapshot = loaded.len();
    for (key, entry) in loaded {
        cache.set(key, entry.value, Some(entry.ttl.unwrap_or(default_ttl)));
    }

    let records = wal.replay()?;
    let replayed_from_wal = records.len();
    for record in records {
        match record.op {
            Op::Set => cache.set(record.key, record.value, Some(default_ttl)),
            Op::Del => cache.del(&record.key),
        }
    }

    tracing::info!(
        loaded_from_snapshot,
        replayed_from_wal,
        "recovery complete"
    );

    Ok(RecoveryReport {
        loaded_from_snapshot,
        replayed_from_wal,
    })
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
