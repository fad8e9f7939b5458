//! Network glue around `distcache-core`: the TCP line-protocol server,
//! heartbeat-based node discovery, and the HTTP status endpoint.
//!
//! `distcache-core` is a library with no socket of its own — everything
//! in this crate exists to drive it from the outside.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod discovery;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod server;

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use distcache_core::{
    CircuitBreaker, DistCacheConfig, HashRing, LruCache, MetricsCollector, ShutdownFlag, Snapshot,
    Wal,
};

use crate::discovery::Discovery;

pub use error::{Error, Result};

/// Shared state handed to every connection task and every HTTP handler.
///
/// One instance per process, held behind `Arc` clones — every field is
/// itself internally synchronized (`parking_lot` locks or atomics), so
/// cloning `AppState` is cheap and never blocks.
#[derive(Clone)]
pub struct AppState {
    /// The LRU+TTL cache itself.
    pub cache: Arc<LruCache<String, String>>,
    /// Write-ahead log backing the cache's mutations.
    pub wal: Arc<Wal>,
    /// Periodic snapshot writer/loader.
    pub snapshot: Arc<Snapshot>,
    /// Consistent hash ring used to route keys to nodes.
    pub ring: Arc<HashRing>,
    /// Breaker guarding the durability path (WAL/snapshot writes).
    pub breaker: Arc<CircuitBreaker>,
    /// Aggregated latency/counter/connection metrics.
    pub metrics: Arc<MetricsCollector>,
    /// Heartbeat-based peer discovery.
    pub discovery: Arc<Discovery>,
    /// Cooperative shutdown signal shared by every background task.
    pub shutdown: ShutdownFlag,
    /// This node's identifier on the hash ring.
    pub node_id: String,
    /// How long a `set` without an explicit TTL lives for.
    pub default_ttl: Duration,
    /// Number of currently open client connections, mirroring
    /// `TCPServer::get_connection_count()`.
    pub connection_count: Arc<AtomicU64>,
}

impl AppState {
    /// Builds the shared state from a loaded configuration.
    ///
    /// Opens the WAL for append (a fatal startup error if it fails) and
    /// seeds the hash ring with this node plus any configured seed
    /// nodes.
    pub fn new(config: &DistCacheConfig) -> Result<Self> {
        let durability = match config.wal.durability.as_str() {
            "group_commit" => distcache_core::Durability::GroupCommit {
                window: Duration::from_millis(config.wal.group_commit_window_ms),
            },
            _ => distcache_core::Durability::FlushPerAppend,
        };
        let wal = Wal::with_durability(&config.wal.path, durability)?;

        let cache = LruCache::new(config.cache.capacity);
        let snapshot = Snapshot::new(&config.snapshot.path, config.snapshot.persist_ttl);

        let ring = HashRing::with_virtual_nodes(config.ring.virtual_nodes);
        ring.add_node(&config.ring.node_id);
        for seed in &config.ring.seed_nodes {
            ring.add_node(seed);
        }

        let breaker = CircuitBreaker::new(
            config.breaker.failure_threshold,
            Duration::from_millis(config.breaker.open_timeout_ms),
        );

        let discovery = Discovery::new(
            config.ring.node_id.clone(),
            Duration::from_millis(config.server.heartbeat_interval_ms),
            Duration::from_millis(config.server.node_timeout_ms),
        );
        for seed in &config.ring.seed_nodes {
            discovery.add_seed_node(seed.clone());
        }

        Ok(Self {
            cache: Arc::new(cache),
            wal: Arc::new(wal),
            snapshot: Arc::new(snapshot),
            ring: Arc::new(ring),
            breaker: Arc::new(breaker),
            metrics: Arc::new(MetricsCollector::new()),
            discovery: Arc::new(discovery),
            shutdown: ShutdownFlag::new(),
            node_id: config.ring.node_id.clone(),
            default_ttl: Duration::from_secs(config.cache.default_ttl_secs),
            connection_count: Arc::new(AtomicU64::new(0)),
        })
    }
}
