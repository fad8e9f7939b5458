//! Error types for the `distcache-server` binary.
//!
//! Thin wrapper around [`distcache_core::Error`] plus the network-facing
//! failure modes the core never sees: bind failures, malformed client
//! input caught before it reaches the dispatcher, and configuration
//! errors at startup.

use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the TCP server, HTTP status endpoint, and
/// discovery loop.
#[derive(Error, Debug)]
pub enum Error {
    /// Propagated from `distcache-core` (cache, WAL, snapshot, config).
    #[error(transparent)]
    Core(#[from] distcache_core::Error),

    /// I/O error not already wrapped by a core operation (socket bind,
    /// accept, read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The client sent a line the protocol parser could not understand.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Configuration failed to load or validate at startup.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error should count as a circuit-breaker failure. A
    /// malformed client line is the client's fault, not the
    /// dependency's.
    #[must_use]
    pub fn trips_breaker(&self) -> bool {
        match self {
            Self::Protocol(_) => false,
            Self::Core(inner) => inner.trips_breaker(),
            Self::Io(_) | Self::Config(_) => true,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
