//! Aggregate request metrics: latency, request count, named counters, and
//! an active-connection gauge, exposed as JSON by the HTTP status
//! endpoint.
//!
//! This is aggregation only — counting what happened, not a push-gateway
//! or time-series system. Grounded in the reference collector's
//! `record_latency` / `increment_counter` / `record_active_connections` /
//! `generate_json` method set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

/// Running totals for request latency, named event counters, and the
/// current active-connection count.
///
/// Latency is accumulated as whole microseconds in an `AtomicU64` rather
/// than summing floats, so concurrent `record_latency` calls never race
/// on a non-atomic float add.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    total_latency_micros: AtomicU64,
    request_count: AtomicU64,
    active_connections: AtomicU64,
    counters: RwLock<HashMap<String, AtomicU64>>,
}

/// JSON-serializable snapshot of the collector's state, as returned by
/// the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Mean request latency in milliseconds (`0.0` if no requests yet).
    pub avg_latency_ms: f64,
    /// Total number of latency samples recorded.
    pub requests: u64,
    /// Current number of active connections.
    pub connections: u64,
    /// Named event counters (e.g. `"get_hits"`, `"wal_errors"`).
    pub counters: HashMap<String, u64>,
}

impl MetricsCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one request's latency, folding it into the running mean.
    pub fn record_latency(&self, latency: std::time::Duration) {
        #[allow(clippy::cast_possible_truncation)]
        let micros = latency.as_micros().min(u128::from(u64::MAX)) as u64;
        self.total_latency_micros
            .fetch_add(micros, Ordering::Relaxed);
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Increments a named counter, creating it at zero if this is the
    /// first occurrence.
    pub fn increment_counter(&self, name: &str) {
        if let Some(counter) = self.counters.read().get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let mut counters = self.counters.write();
        counters
            .entry(name.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Records the current number of active connections (a gauge, not an
    /// accumulator: the latest call wins).
    pub fn record_active_connections(&self, count: u64) {
        self.active_connections.store(count, Ordering::Relaxed);
    }

    /// Produces a point-in-time snapshot suitable for JSON serialization.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.request_count.load(Ordering::Relaxed);
        let total_micros = self.total_latency_micros.load(Ordering::Relaxed);
        #[allow(clippy::cast_precision_loss)]
        let avg_latency_ms = if requests == 0 {
            0.0
        } else {
            (total_micros as f64 / requests as f64) / 1000.0
        };

        let counters = self
            .counters
            .read()
            .iter()
            .map(|(name, count)| (name.clone(), count.load(Ordering::Relaxed)))
            .collect();

        MetricsSnapshot {
            avg_latency_ms,
            requests,
            connections: self.active_connections.load(Ordering::Relaxed),
            counters,
        }
    }

    /// Serializes the current snapshot to a JSON string, matching the
    /// reference collector's `generate_json` shape (`avg_latency`,
    /// `requests`, `connections`, plus one field per named counter).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails, which cannot happen for
    /// this type's field set but is propagated rather than unwrapped.
    pub fn generate_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
