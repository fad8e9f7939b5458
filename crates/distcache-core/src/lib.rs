//! # `DistCache` Core
//!
//! The core of a distributed in-memory key-value cache that speaks a
//! Redis-compatible line protocol: a concurrent LRU cache with TTL, a
//! write-ahead log paired with point-in-time snapshots, a consistent-hash
//! ring for data placement, and a circuit breaker for failure isolation.
//!
//! This crate has no networking: it is driven by `distcache-server`'s TCP
//! accept loop, line-protocol parser, and HTTP status endpoint, which are
//! thin glue around the four subsystems below.
//!
//! ## Quick start
//!
//! ```
//! use distcache_core::{HashRing, LruCache};
//!
//! let cache: LruCache<String, String> = LruCache::new(1024);
//! cache.set("greeting".into(), "hello".into(), None);
//! assert_eq!(cache.get(&"greeting".to_string()), Some("hello".to_string()));
//!
//! let ring = HashRing::new();
//! ring.add_node("node-1");
//! assert_eq!(ring.get_node("greeting"), "node-1");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod escape;
pub mod hash_ring;
pub mod metrics;
pub mod recovery;
pub mod shutdown;
pub mod snapshot;
mod sync;
pub mod sweeper;
pub mod wal;

pub use cache::{CacheStats, LruCache};
pub use circuit_breaker::{CircuitBreaker, State as BreakerState};
pub use config::{
    BreakerConfig, CacheConfig, DistCacheConfig, LoggingConfig, RingConfig, ServerConfig,
    SnapshotConfig, WalConfig,
};
pub use error::{Error, Result};
pub use hash_ring::HashRing;
pub use metrics::MetricsCollector;
pub use recovery::recover;
pub use shutdown::ShutdownFlag;
pub use snapshot::{LoadedEntry, Snapshot, SnapshotEntry};
pub use sweeper::{spawn_sweeper, SweeperHandle};
pub use wal::{Durability, Op, Record, Wal};
