//! `DistCache` configuration.
//!
//! Loaded from defaults < `distcache.toml` < `DISTCACHE_*` environment
//! variables < runtime/CLI overrides, via `figment` layering.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (CLI flags)
//! 2. Environment variables (`DISTCACHE_*`)
//! 3. Configuration file (`distcache.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration from file, string, or environment.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A value was out of its allowed range.
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Cache section: capacity and default TTL for the LRU store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache holds.
    pub capacity: usize,
    /// Default TTL in seconds applied when `set` omits one.
    pub default_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            default_ttl_secs: 24 * 60 * 60,
        }
    }
}

/// Write-ahead log section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalConfig {
    /// Path to the WAL file.
    pub path: String,
    /// Durability tier: `"flush_per_append"` or `"group_commit"`.
    pub durability: String,
    /// Group-commit flush window in milliseconds (ignored unless
    /// `durability = "group_commit"`).
    pub group_commit_window_ms: u64,
}

impl Default for WalConfig {
    fn default() -> Self {
        Self {
            path: "distcache.wal".to_string(),
            durability: "flush_per_append".to_string(),
            group_commit_window_ms: 10,
        }
    }
}

/// Snapshot persistence section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Path to the snapshot file.
    pub path: String,
    /// Sweeper interval, in seconds, between snapshot attempts.
    pub interval_secs: u64,
    /// Whether to append a third escaped field carrying `expire_at` so
    /// TTLs survive a restart. Off by default: the two-field form is the
    /// documented, backward-compatible baseline.
    pub persist_ttl: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: "distcache.snapshot".to_string(),
            interval_secs: 300,
            persist_ttl: false,
        }
    }
}

/// Consistent hash ring section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// This node's identifier, inserted into the ring at startup.
    pub node_id: String,
    /// Seed nodes to add to the ring alongside `node_id`.
    pub seed_nodes: Vec<String>,
    /// Number of virtual positions per physical node.
    pub virtual_nodes: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            node_id: "localhost".to_string(),
            seed_nodes: Vec::new(),
            virtual_nodes: crate::hash_ring::DEFAULT_VIRTUAL_NODES,
        }
    }
}

/// Circuit breaker section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before tripping to `OPEN`.
    pub failure_threshold: u32,
    /// Time `OPEN` must hold before admitting a `HALF_OPEN` probe.
    pub open_timeout_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout_ms: 30_000,
        }
    }
}

/// Network-facing server section (TCP line protocol, HTTP status,
/// heartbeat discovery).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind the TCP listener to.
    pub host: String,
    /// TCP port for the line protocol (Redis-compatible default: 6379).
    pub port: u16,
    /// HTTP port for the status endpoint.
    pub http_port: u16,
    /// Heartbeat broadcast interval, in milliseconds.
    pub heartbeat_interval_ms: u64,
    /// Time since last heartbeat before a peer is considered dead.
    pub node_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6379,
            http_port: 8080,
            heartbeat_interval_ms: 5_000,
            node_timeout_ms: 15_000,
        }
    }
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: "text" or "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Root `DistCache` configuration, one section per subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DistCacheConfig {
    /// LRU cache section.
    pub cache: CacheConfig,
    /// Write-ahead log section.
    pub wal: WalConfig,
    /// Snapshot persistence section.
    pub snapshot: SnapshotConfig,
    /// Consistent hash ring section.
    pub ring: RingConfig,
    /// Circuit breaker section.
    pub breaker: BreakerConfig,
    /// Network server section.
    pub server: ServerConfig,
    /// Logging section.
    pub logging: LoggingConfig,
}

impl DistCacheConfig {
    /// Loads configuration from `distcache.toml` in the working directory,
    /// layered with environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but fails to parse, or an
    /// environment variable holds a value of the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("distcache.toml")
    }

    /// Loads configuration from a specific file path (missing file is not
    /// an error; defaults apply).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but fails to parse, or an
    /// environment variable holds a value of the wrong type.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("DISTCACHE_").split("_").lowercase(false));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Builds a configuration from a TOML string, useful in tests.
    ///
    /// # Errors
    ///
    /// Returns an error if `toml_str` fails to parse.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates value ranges, failing fast with a descriptive error
    /// rather than letting an out-of-range setting surface as a confusing
    /// runtime failure later.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cache.capacity".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        if self.ring.virtual_nodes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ring.virtual_nodes".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        if self.breaker.failure_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                key: "breaker.failure_threshold".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        let valid_durability = ["flush_per_append", "group_commit"];
        if !valid_durability.contains(&self.wal.durability.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "wal.durability".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.wal.durability, valid_durability
                ),
            });
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.port".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        if self.server.http_port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.http_port".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
