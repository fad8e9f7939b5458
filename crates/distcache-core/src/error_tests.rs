//! Tests for `error` module

use super::error::*;

#[test]
fn error_codes_are_unique_and_follow_pattern() {
    let errors: Vec<Error> = vec![
        Error::Io(std::io::Error::other("disk full")),
        Error::FatalStartup("cannot open WAL".into()),
        Error::Config("bad value".into()),
        Error::ClientError("unknown command".into()),
        Error::Internal("invariant violated".into()),
    ];

    let codes: Vec<&str> = errors.iter().map(Error::code).collect();
    let mut unique = codes.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(codes.len(), unique.len(), "error codes must be unique");

    for code in &codes {
        assert!(code.starts_with("DCACHE-"), "code {code} should start with DCACHE-");
    }
}

#[test]
fn display_includes_code_and_message() {
    let err = Error::ClientError("wrong arity".into());
    let display = format!("{err}");
    assert!(display.contains("DCACHE-004"));
    assert!(display.contains("wrong arity"));
}

#[test]
fn from_io_error_preserves_message() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert_eq!(err.code(), "DCACHE-001");
    assert!(format!("{err}").contains("file not found"));
}

#[test]
fn from_config_error_wraps_as_config_variant() {
    let config_err = crate::config::ConfigError::InvalidValue {
        key: "cache.capacity".to_string(),
        message: "must be non-zero".to_string(),
    };
    let err: Error = config_err.into();
    assert_eq!(err.code(), "DCACHE-003");
    assert!(format!("{err}").contains("cache.capacity"));
}

#[test]
fn client_errors_never_trip_the_breaker() {
    assert!(!Error::ClientError("bad command".into()).trips_breaker());
}

#[test]
fn non_client_errors_trip_the_breaker() {
    assert!(Error::Io(std::io::Error::other("x")).trips_breaker());
    assert!(Error::Internal("x".into()).trips_breaker());
    assert!(Error::FatalStartup("x".into()).trips_breaker());
}

#[test]
fn only_fatal_startup_reports_is_fatal_startup() {
    assert!(Error::FatalStartup("cannot bind".into()).is_fatal_startup());
    assert!(!Error::ClientError("x".into()).is_fatal_startup());
    assert!(!Error::Io(std::io::Error::other("x")).is_fatal_startup());
}

#[test]
fn error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
