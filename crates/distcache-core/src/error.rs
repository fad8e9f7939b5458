//! Error types for `DistCache`.
//!
//! A single enum covers every failure mode the core surfaces, so callers
//! at the network edge can match on it once and decide what to tell the
//! client and whether to record a circuit-breaker failure.

use thiserror::Error;

/// Result type alias for `DistCache` core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `DistCache` core operations.
///
/// Error codes follow the pattern `DCACHE-XXX` for easy cross-referencing
/// in logs and bug reports.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (DCACHE-001). Propagated from WAL/snapshot file
    /// operations; the request handler converts this into a client-visible
    /// error and records a breaker failure.
    #[error("[DCACHE-001] I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fatal startup error (DCACHE-002): the WAL could not be opened for
    /// append, or a configured path is unreadable. The process should
    /// exit with a non-zero status rather than run in a half-initialized
    /// state.
    #[error("[DCACHE-002] fatal startup error: {0}")]
    FatalStartup(String),

    /// Configuration error (DCACHE-003).
    #[error("[DCACHE-003] configuration error: {0}")]
    Config(String),

    /// Client error (DCACHE-004): unknown command or wrong arity. Does not
    /// trip the circuit breaker.
    #[error("[DCACHE-004] {0}")]
    ClientError(String),

    /// Internal error (DCACHE-005). Indicates an invariant violation;
    /// please report if encountered.
    #[error("[DCACHE-005] internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code (e.g., "DCACHE-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "DCACHE-001",
            Self::FatalStartup(_) => "DCACHE-002",
            Self::Config(_) => "DCACHE-003",
            Self::ClientError(_) => "DCACHE-004",
            Self::Internal(_) => "DCACHE-005",
        }
    }

    /// Whether this error should count as a circuit-breaker failure.
    /// Client errors (bad command, wrong arity) are the caller's fault,
    /// not the dependency's, so they must not trip the breaker.
    #[must_use]
    pub const fn trips_breaker(&self) -> bool {
        !matches!(self, Self::ClientError(_))
    }

    /// Whether this error is fatal at startup (should exit the process
    /// rather than be handled per-request).
    #[must_use]
    pub const fn is_fatal_startup(&self) -> bool {
        matches!(self, Self::FatalStartup(_))
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
