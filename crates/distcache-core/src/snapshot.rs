//! Point-in-time persistence of the live cache state.
//!
//! Unlike the reference implementation, writes are atomic: the new
//! snapshot is written to a temp file in the same directory and `rename`d
//! into place, so a crash mid-write never leaves a torn snapshot behind.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::escape::{escape, unescape};
use crate::error::Result;

/// A single entry as restored from a snapshot file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedEntry {
    /// The stored value.
    pub value: String,
    /// TTL recovered from the optional third field, if the snapshot was
    /// written with `persist_ttl` enabled and a value was present.
    pub ttl: Option<Duration>,
}

/// A live entry to be written out by `snapshot`.
pub struct SnapshotEntry<'a> {
    /// The key.
    pub key: &'a str,
    /// The value.
    pub value: &'a str,
    /// Remaining time-to-live, written only when `persist_ttl` is enabled.
    pub ttl: Option<Duration>,
}

/// Snapshot file reader/writer.
pub struct Snapshot {
    path: PathBuf,
    /// When set, `snapshot` appends a third escaped field carrying
    /// `expire_at` as milliseconds-until-expiry. The two-field form
    /// remains readable regardless of this setting (backward
    /// compatible); a missing third field on load yields `ttl: None`,
    /// letting the caller apply its own default TTL.
    persist_ttl: bool,
}

impl Snapshot {
    /// Creates a snapshot handle for `path`. TTL persistence is a known
    /// data-loss vector across restarts when disabled (the documented
    /// limitation this type preserves by default).
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P, persist_ttl: bool) -> Self {
        Self { path: path.as_ref().to_path_buf(), persist_ttl }
    }

    /// Writes all entries to the snapshot file, atomically replacing any
    /// previous snapshot via write-to-temp + rename.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp file cannot be written or the rename
    /// fails.
    pub fn snapshot<'a>(&self, entries: impl IntoIterator<Item = SnapshotEntry<'a>>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            for entry in entries {
                if self.persist_ttl {
                    let ttl_ms = entry.ttl.map_or(0, |d| d.as_millis());
                    writeln!(
                        tmp,
                        "{} {} {}",
                        escape(entry.key),
                        escape(entry.value),
                        ttl_ms
                    )?;
                } else {
                    writeln!(tmp, "{} {}", escape(entry.key), escape(entry.value))?;
                }
            }
            tmp.flush()?;
            tmp.sync_all()?;
        }

        std::fs::rename(&tmp_path, &self.path)?;
        tracing::info!(path = %self.path.display(), "snapshot written");
        Ok(())
    }

    /// Reads the snapshot file if present, returning key -> entry.
    /// A missing file is not an error; it returns an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<HashMap<String, LoadedEntry>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut data = HashMap::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let Some(space) = line.find(' ') else {
                // Lines without a space separator are skipped.
                continue;
            };
            let (escaped_key, rest) = line.split_at(space);
            let rest = &rest[1..];

            let (escaped_value, ttl) = match rest.rfind(' ') {
                Some(pos) if rest[pos + 1..].chars().all(|c| c.is_ascii_digit()) && !rest[pos + 1..].is_empty() => {
                    let ms: u64 = rest[pos + 1..].parse().unwrap_or(0);
                    (&rest[..pos], Some(Duration::from_millis(ms)))
                }
                _ => (rest, None),
            };

            let key = unescape(escaped_key);
            let value = unescape(escaped_value);
            data.insert(key, LoadedEntry { value, ttl });
        }

        Ok(data)
    }

    /// Runs `snapshot` on a background task, letting the caller continue
    /// without waiting for the write to land on disk. Returns a handle the
    /// caller can await to learn whether the write (and therefore the WAL
    /// truncation that must follow it) actually succeeded.
    pub fn async_snapshot(
        self: std::sync::Arc<Self>,
        entries: Vec<(String, String, Option<Duration>)>,
    ) -> tokio::task::JoinHandle<Result<()>> {
        tokio::task::spawn_blocking(move || {
            let owned: Vec<SnapshotEntry<'_>> = entries
                .iter()
                .map(|(k, v, ttl)| SnapshotEntry { key: k, value: v, ttl: *ttl })
                .collect();
            let result = self.snapshot(owned);
            match &result {
                Ok(()) => tracing::info!("async snapshot completed"),
                Err(e) => tracing::error!(error = %e, "async snapshot failed"),
            }
            result
        })
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
