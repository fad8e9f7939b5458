//! Failure-isolation state machine interposed between request ingress and
//! the cache.
//!
//! Three states — `CLOSED` (admitting), `OPEN` (rejecting), `HALF_OPEN`
//! (probing) — transitioned with compare-and-swap on an atomic state field.
//! See the module-level invariants in the transition table below.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// Breaker state. Repr matches the atomic storage used for `state_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Requests are admitted normally.
    Closed,
    /// Requests are rejected until `open_timeout` elapses.
    Open,
    /// A single probe window: requests are admitted to test recovery.
    HalfOpen,
}

impl State {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::HalfOpen => 2,
        }
    }

    const fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Open,
            2 => Self::HalfOpen,
            _ => Self::Closed,
        }
    }

    /// Human-readable state name, used by the status endpoint.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        }
    }
}

/// Circuit breaker guarding a downstream dependency.
///
/// `failure_threshold` consecutive failures while `CLOSED` trip the breaker
/// to `OPEN`; after `open_timeout` elapses, the next admission check moves
/// it to `HALF_OPEN`, which **permits concurrent probes** rather than
/// admitting exactly one caller — multiple threads may observe the timeout
/// simultaneously and all enter `HALF_OPEN` together; a single success
/// collapses them all back to `CLOSED`.
pub struct CircuitBreaker {
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    failure_threshold: u32,
    open_timeout: Duration,
    last_failure: parking_lot::Mutex<Instant>,
}

impl CircuitBreaker {
    /// Creates a new breaker in the `CLOSED` state.
    #[must_use]
    pub fn new(failure_threshold: u32, open_timeout: Duration) -> Self {
        Self {
            state: AtomicU8::new(State::Closed.to_u8()),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            failure_threshold,
            open_timeout,
            last_failure: parking_lot::Mutex::new(Instant::now()),
        }
    }

    /// Returns whether a request should be admitted, performing the
    /// `OPEN` -> `HALF_OPEN` transition as a side effect when the timeout
    /// has elapsed.
    #[must_use]
    pub fn allow_request(&self) -> bool {
        match self.state() {
            State::Closed | State::HalfOpen => true,
            State::Open => {
                if self.timeout_expired() {
                    self.transition_to(State::HalfOpen);
                    tracing::info!("circuit breaker: OPEN -> HALF_OPEN (timeout expired)");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records a successful call. In `HALF_OPEN`, collapses the breaker
    /// back to `CLOSED` and resets the failure counter. In `CLOSED`,
    /// success does *not* reset the counter (pessimistic default).
    pub fn record_success(&self) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
        if self.state() == State::HalfOpen {
            self.failure_count.store(0, Ordering::Relaxed);
            self.transition_to(State::Closed);
            tracing::info!("circuit breaker: HALF_OPEN -> CLOSED (success recorded)");
        }
    }

    /// Records a failed call, driving `CLOSED` -> `OPEN` once the
    /// threshold is reached and `HALF_OPEN` -> `OPEN` unconditionally.
    pub fn record_failure(&self) {
        *self.last_failure.lock() = Instant::now();

        match self.state() {
            State::Closed => {
                let count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
                if count >= self.failure_threshold {
                    self.transition_to(State::Open);
                    tracing::warn!(failures = count, "circuit breaker: CLOSED -> OPEN");
                }
            }
            State::HalfOpen => {
                self.transition_to(State::Open);
                tracing::warn!("circuit breaker: HALF_OPEN -> OPEN (probe failed)");
            }
            State::Open => {}
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> State {
        State::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Current consecutive-failure count.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Relaxed)
    }

    fn transition_to(&self, new_state: State) {
        self.state.store(new_state.to_u8(), Ordering::Release);
    }

    fn timeout_expired(&self) -> bool {
        self.last_failure.lock().elapsed() >= self.open_timeout
    }
}

#[cfg(test)]
#[path = "circuit_breaker_tests.rs"]
mod tests;
