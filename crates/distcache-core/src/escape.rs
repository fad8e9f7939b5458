//! Shared escape/unescape routine for the line-oriented WAL and snapshot
//! formats.
//!
//! Both formats are space-delimited text, so keys and values need a way to
//! carry whitespace, newlines, and backslashes without corrupting the
//! framing. The scheme is byte-for-byte what the reference persistence
//! layer uses: `\s \n \r \t \\`.

/// Escapes `input` so it contains no raw space, LF, CR, tab, or backslash.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            ' ' => escaped.push_str("\\s"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Reverses [`escape`]. An unrecognized escape sequence is passed through
/// as-is (the escaping backslash is dropped), matching the reference
/// implementation's tolerant behavior rather than rejecting the record.
#[must_use]
pub fn unescape(input: &str) -> String {
    let mut unescaped = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }

        match chars.peek() {
            Some('s') => {
                unescaped.push(' ');
                chars.next();
            }
            Some('n') => {
                unescaped.push('\n');
                chars.next();
            }
            Some('r') => {
                unescaped.push('\r');
                chars.next();
            }
            Some('t') => {
                unescaped.push('\t');
                chars.next();
            }
            Some('\\') => {
                unescaped.push('\\');
                chars.next();
            }
            _ => unescaped.push(c),
        }
    }

    unescaped
}

#[cfg(test)]
#[path = "escape_tests.rs"]
mod tests;
