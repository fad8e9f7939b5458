use super::*;

#[test]
fn parses_set_with_two_args() {
    assert_eq!(
        parse("SET foo bar").unwrap(),
        Command::Set {
            key: "foo".to_string(),
            value: "bar".to_string()
        }
    );
}

#[test]
fn commands_are_case_insensitive() {
    assert_eq!(
        parse("set foo bar").unwrap(),
        Command::Set {
            key: "foo".to_string(),
            value: "bar".to_string()
        }
    );
    assert_eq!(parse("Ping").unwrap(), Command::Ping);
}

#[test]
fn parses_get_and_del() {
    assert_eq!(
        parse("GET foo").unwrap(),
        Command::Get {
            key: "foo".to_string()
        }
    );
    assert_eq!(
        parse("DEL foo").unwrap(),
        Command::Del {
            key: "foo".to_string()
        }
    );
}

#[test]
fn parses_ping_with_no_args() {
    assert_eq!(parse("PING").unwrap(), Command::Ping);
}

#[test]
fn trims_surrounding_whitespace_and_crlf() {
    assert_eq!(parse("  GET foo  \r\n").unwrap(), Command::Get { key: "foo".to_string() });
}

#[test]
fn rejects_empty_line() {
    assert!(parse("").is_err());
    assert!(parse("   ").is_err());
}

#[test]
fn rejects_wrong_arity() {
    assert!(parse("SET foo").is_err());
    assert!(parse("GET").is_err());
    assert!(parse("DEL a b").is_err());
    assert!(parse("PING extra").is_err());
}

#[test]
fn rejects_unknown_command() {
    let err = parse("FOO bar").unwrap_err();
    assert!(err.contains("unknown command"));
}

#[test]
fn serializes_simple_string_frame() {
    assert_eq!(serialize_simple("OK"), "+OK\r\n");
}

#[test]
fn serializes_error_frame() {
    assert_eq!(serialize_error("ERR bad"), "-ERR bad\r\n");
}

#[test]
fn serializes_integer_frame() {
    assert_eq!(serialize_integer(42), ":42\r\n");
}

#[test]
fn serializes_bulk_frame_with_length_prefix() {
    assert_eq!(serialize_bulk("hello"), "$5\r\nhello\r\n");
}

#[test]
fn serializes_nil_frame_for_miss() {
    assert_eq!(serialize_nil(), "$-1\r\n");
}

#[test]
fn serializes_array_of_bulk_strings() {
    let items = vec!["a".to_string(), "bb".to_string()];
    assert_eq!(serialize_array(&items), "*2\r\n$1\r\na\r\n$2\r\nbb\r\n");
}
