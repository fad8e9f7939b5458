use super::*;

#[test]
fn protocol_errors_never_trip_the_breaker() {
    let err = Error::Protocol("unknown command FOO".into());
    assert!(!err.trips_breaker());
}

#[test]
fn io_errors_trip_the_breaker() {
    let err = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
    assert!(err.trips_breaker());
}

#[test]
fn config_errors_trip_the_breaker() {
    let err = Error::Config("missing node_id".into());
    assert!(err.trips_breaker());
}

#[test]
fn core_errors_delegate_trips_breaker_to_the_inner_error() {
    let client = Error::from(distcache_core::Error::ClientError("bad key".into()));
    assert!(!client.trips_breaker());

    let io = Error::from(distcache_core::Error::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "disk full",
    )));
    assert!(io.trips_breaker());
}

#[test]
fn display_messages_are_human_readable() {
    let err = Error::Protocol("expected CRLF".into());
    assert_eq!(err.to_string(), "protocol error: expected CRLF");
}
