//! Process-wide cooperative shutdown flag.
//!
//! The only global mutable state in this design: a single atomic, polled
//! by the background sweeper and any in-flight async snapshot task, and
//! set by the signal handler. Shutdown is cooperative — in-flight
//! requests run to completion, no hard cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable handle to a shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Creates a new, not-yet-shutting-down flag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests shutdown. Idempotent — a second call is a no-op.
    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
