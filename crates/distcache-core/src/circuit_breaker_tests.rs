//! Tests for `circuit_breaker` module

use super::*;
use std::thread::sleep;

#[test]
fn starts_closed_and_admits() {
    let breaker = CircuitBreaker::new(3, Duration::from_millis(100));
    assert_eq!(breaker.state(), State::Closed);
    assert!(breaker.allow_request());
}

#[test]
fn failures_below_threshold_stay_closed() {
    let breaker = CircuitBreaker::new(3, Duration::from_millis(100));
    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.state(), State::Closed);
    assert!(breaker.allow_request());
}

#[test]
fn success_in_closed_does_not_reset_counter() {
    let breaker = CircuitBreaker::new(3, Duration::from_millis(100));
    breaker.record_failure();
    breaker.record_failure();
    breaker.record_success();
    assert_eq!(breaker.failure_count(), 2, "success in CLOSED must not reset the counter");
}

#[test]
fn threshold_failures_trip_to_open() {
    let breaker = CircuitBreaker::new(2, Duration::from_millis(100));
    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.state(), State::Open);
    assert!(!breaker.allow_request());
}

#[test]
fn open_transitions_to_half_open_after_timeout() {
    let breaker = CircuitBreaker::new(2, Duration::from_millis(50));
    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.state(), State::Open);

    sleep(Duration::from_millis(80));

    assert!(breaker.allow_request());
    assert_eq!(breaker.state(), State::HalfOpen);
}

#[test]
fn half_open_success_closes_and_resets_counter() {
    let breaker = CircuitBreaker::new(2, Duration::from_millis(50));
    breaker.record_failure();
    breaker.record_failure();
    sleep(Duration::from_millis(80));
    breaker.allow_request();
    assert_eq!(breaker.state(), State::HalfOpen);

    breaker.record_success();
    assert_eq!(breaker.state(), State::Closed);
    assert_eq!(breaker.failure_count(), 0);
}

#[test]
fn half_open_failure_reopens() {
    let breaker = CircuitBreaker::new(2, Duration::from_millis(50));
    breaker.record_failure();
    breaker.record_failure();
    sleep(Duration::from_millis(80));
    breaker.allow_request();
    assert_eq!(breaker.state(), State::HalfOpen);

    breaker.record_failure();
    assert_eq!(breaker.state(), State::Open);
}

#[test]
fn full_cycle_matches_scenario_s6() {
    let breaker = CircuitBreaker::new(2, Duration::from_millis(100));
    breaker.record_failure();
    breaker.record_failure();
    assert_eq!(breaker.state(), State::Open);
    assert!(!breaker.allow_request());

    sleep(Duration::from_millis(150));

    assert!(breaker.allow_request());
    assert_eq!(breaker.state(), State::HalfOpen);

    breaker.record_success();
    assert_eq!(breaker.state(), State::Closed);
    assert_eq!(breaker.failure_count(), 0);
}
