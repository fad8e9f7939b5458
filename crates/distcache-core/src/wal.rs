//! Write-ahead log: makes every acknowledged mutation durable in a single
//! ordered stream before the client is told the write succeeded.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::escape::{escape, unescape};
use crate::error::{Error, Result};

/// A mutation recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Insert or overwrite a key.
    Set,
    /// Remove a key.
    Del,
}

impl Op {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "SET",
            Self::Del => "DEL",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "SET" => Some(Self::Set),
            "DEL" => Some(Self::Del),
            _ => None,
        }
    }
}

/// A single replayed record: operation, key, and value (empty for `DEL`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The operation this record applies.
    pub op: Op,
    /// The affected key.
    pub key: String,
    /// The value (empty string for `DEL`).
    pub value: String,
}

/// Durability tier controlling when `append` becomes visible to a crash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Every append flushes before returning (default).
    FlushPerAppend,
    /// Appends batch within `window` before a single flush that wakes all
    /// waiters; `append` itself blocks until that flush has happened, so
    /// the caller's ack is never sent ahead of durability.
    GroupCommit {
        /// Maximum time a batch is held open before being flushed.
        window: Duration,
    },
}

struct Inner {
    file: File,
    pending_since: Option<Instant>,
    /// Bumped each time a group-commit flush completes. An appender
    /// records the generation it joined the batch under and blocks on
    /// `flushed` until this counter moves past it — either because it
    /// flushed the batch itself after `window` elapsed, or because a
    /// later appender did.
    generation: u64,
}

/// Append-only, ordered log of cache mutations.
pub struct Wal {
    path: PathBuf,
    durability: Durability,
    inner: Mutex<Inner>,
    flushed: Condvar,
    /// Number of records currently in the log (since the last
    /// `truncate`), maintained independently of `replay` so the status
    /// endpoint never has to re-read and re-parse the whole file just to
    /// report a backlog size.
    pending_ops: AtomicU64,
}

impl Wal {
    /// Opens (creating if absent) the WAL file at `path` with
    /// flush-per-append durability.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened for append.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_durability(path, Durability::FlushPerAppend)
    }

    /// Opens the WAL file with an explicit durability tier.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened for append.
    pub fn with_durability<P: AsRef<Path>>(path: P, durability: Durability) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::FatalStartup(format!("cannot open WAL {}: {e}", path.display())))?;

        Ok(Self {
            path,
            durability,
            inner: Mutex::new(Inner {
                file,
                pending_since: None,
                generation: 0,
            }),
            flushed: Condvar::new(),
            pending_ops: AtomicU64::new(0),
        })
    }

    /// Serializes and appends a record, synchronously flushing per the
    /// configured durability tier before returning. The WAL append for a
    /// mutation must happen-before the ack to the client: under
    /// `FlushPerAppend` this is immediate; under `GroupCommit` this call
    /// blocks until the batch containing this record has actually been
    /// flushed, so the client is never acked ahead of durability.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or flush fails.
    pub fn append(&self, op: Op, key: &str, value: Option<&str>) -> Result<()> {
        let line = format!(
            "{} {} {}\n",
            op.as_str(),
            escape(key),
            escape(value.unwrap_or(""))
        );

        let mut inner = self.inner.lock();
        inner.file.write_all(line.as_bytes())?;
        self.pending_ops.fetch_add(1, Ordering::Relaxed);

        match self.durability {
            Durability::FlushPerAppend => {
                inner.file.flush()?;
            }
            Durability::GroupCommit { window } => {
                let joined_generation = inner.generation;
                let deadline = *inner.pending_since.get_or_insert_with(Instant::now) + window;

                // Block until either this call's own wait times out (in
                // which case it performs the flush itself) or another
                // appender's batch flush bumps `generation` past the one
                // we joined under.
                while inner.generation == joined_generation {
                    let now = Instant::now();
                    if now >= deadline {
                        inner.file.flush()?;
                        inner.generation += 1;
                        inner.pending_since = None;
                        self.flushed.notify_all();
                        break;
                    }
                    self.flushed.wait_for(&mut inner, deadline - now);
                }
            }
        }

        Ok(())
    }

    /// Flushes any buffered writes, releasing any `GroupCommit` appenders
    /// currently waiting on the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.file.flush()?;
        inner.generation += 1;
        inner.pending_since = None;
        self.flushed.notify_all();
        Ok(())
    }

    /// Empties the log. Callers must invoke this only after a successful,
    /// fsynced snapshot — the WAL is not truncated during recovery itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be reopened for truncation.
    pub fn truncate(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        inner.file = OpenOptions::new().append(true).open(&self.path)?;
        drop(file);
        inner.pending_since = None;
        inner.generation += 1;
        self.flushed.notify_all();
        self.pending_ops.store(0, Ordering::Relaxed);
        tracing::info!(path = %self.path.display(), "WAL truncated");
        Ok(())
    }

    /// Number of records appended since the log was last truncated, for
    /// the status endpoint. Maintained as a running counter rather than
    /// derived from `replay`, which would re-read and re-parse the whole
    /// file on every call and race `replay`'s single-reader assumption
    /// against concurrent appends.
    #[must_use]
    pub fn pending_ops(&self) -> u64 {
        self.pending_ops.load(Ordering::Relaxed)
    }

    /// Reads the file from the beginning and returns records in append
    /// order. A trailing line that fails to parse (a partial record from a
    /// crash mid-write) is dropped silently rather than raising an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the file exists but cannot be read.
    pub fn replay(&self) -> Result<Vec<Record>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if let Some(record) = parse_line(&line) {
                records.push(record);
            }
            // A malformed line is dropped silently, matching the
            // pre-ack contract: it was never acknowledged, so it never
            // happened.
        }

        Ok(records)
    }
}

fn parse_line(line: &str) -> Option<Record> {
    let mut parts = line.splitn(3, ' ');
    let op = Op::parse(parts.next()?)?;
    let key = unescape(parts.next()?);
    let value = unescape(parts.next().unwrap_or(""));
    Some(Record { op, key, value })
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
