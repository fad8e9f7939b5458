//! Line-protocol parsing and RESP-subset framing for client connections.
//!
//! Parses the `SET`/`GET`/`DEL`/`PING` subset of the Redis line protocol,
//! and serializes the five RESP frame kinds it uses: simple string,
//! error, integer, bulk, and nil.

use std::fmt;

/// A parsed client command, normalized to upper case before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SET key value`
    Set { key: String, value: String },
    /// `GET key`
    Get { key: String },
    /// `DEL key`
    Del { key: String },
    /// `PING`
    Ping,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set { .. } => write!(f, "SET"),
            Self::Get { .. } => write!(f, "GET"),
            Self::Del { .. } => write!(f, "DEL"),
            Self::Ping => write!(f, "PING"),
        }
    }
}

/// Parses one line of client input into a [`Command`].
///
/// Commands are case-insensitive and normalized to upper case before
/// matching. Returns `Err` with a human-readable reason on an unknown
/// command or wrong arity — the caller turns this into a client-visible
/// `-ERR ...\r\n` frame without tripping the breaker.
pub fn parse(line: &str) -> Result<Command, String> {
    let tokens = split(trim(line));
    let Some((head, args)) = tokens.split_first() else {
        return Err("empty command".to_string());
    };

    match to_upper(head).as_str() {
        "SET" => match args {
            [key, value] => Ok(Command::Set {
                key: key.clone(),
                value: value.clone(),
            }),
            _ => Err("wrong number of arguments for SET".to_string()),
        },
        "GET" => match args {
            [key] => Ok(Command::Get { key: key.clone() }),
            _ => Err("wrong number of arguments for GET".to_string()),
        },
        "DEL" => match args {
            [key] => Ok(Command::Del { key: key.clone() }),
            _ => Err("wrong number of arguments for DEL".to_string()),
        },
        "PING" => match args {
            [] => Ok(Command::Ping),
            _ => Err("wrong number of arguments for PING".to_string()),
        },
        other => Err(format!("unknown command '{other}'")),
    }
}

/// `+result\r\n`
#[must_use]
pub fn serialize_simple(result: &str) -> String {
    format!("+{result}\r\n")
}

/// `-error\r\n`
#[must_use]
pub fn serialize_error(error: &str) -> String {
    format!("-{error}\r\n")
}

/// `:value\r\n`
#[must_use]
pub fn serialize_integer(value: i64) -> String {
    format!(":{value}\r\n")
}

/// `$len\r\ndata\r\n`
#[must_use]
pub fn serialize_bulk(data: &str) -> String {
    format!("${}\r\n{data}\r\n", data.len())
}

/// `$-1\r\n`, the nil frame used for cache misses.
#[must_use]
pub fn serialize_nil() -> String {
    "$-1\r\n".to_string()
}

/// `*n\r\n` followed by each item framed as a bulk string.
#[must_use]
pub fn serialize_array(items: &[String]) -> String {
    let mut out = format!("*{}\r\n", items.len());
    for item in items {
        out.push_str(&serialize_bulk(item));
    }
    out
}

fn to_upper(s: &str) -> String {
    s.to_ascii_uppercase()
}

fn trim(s: &str) -> &str {
    s.trim_matches(|c: char| c == ' ' || c == '\t' || c == '\r' || c == '\n')
}

fn split(s: &str) -> Vec<String> {
    s.split(' ')
        .map(trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
