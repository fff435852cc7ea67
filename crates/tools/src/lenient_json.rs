//! Lenient JSON Helpers
//!
//! LLMs emit JSON that is almost, but not quite, valid. These helpers find
//! object boundaries in free text and repair the most common defect
//! (trailing commas) before handing the text to serde_json.

use serde_json::{Map, Value};

/// Byte index of the `}` that closes the object opened at `open`.
///
/// Braces inside string literals are ignored and backslash escapes inside
/// strings are honoured. Returns `None` when `open` is not a `{` or the
/// object is not closed before the end of `text`.
pub fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    // Scanning bytes is safe: every byte we match on is ASCII, and ASCII
    // bytes never occur inside a multi-byte UTF-8 sequence.
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if escape_next {
            escape_next = false;
            continue;
        }
        match b {
            b'\\' if in_string => escape_next = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove commas that directly precede a closing `}` or `]`.
///
/// Commas inside string literals are left alone.
pub fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape_next = false;
    let mut chars = text.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if in_string {
            out.push(ch);
            if escape_next {
                escape_next = false;
            } else if ch == '\\' {
                escape_next = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => {
                in_string = true;
                out.push(ch);
            }
            ',' => {
                let next = text[i + 1..].trim_start().chars().next();
                if !matches!(next, Some('}') | Some(']')) {
                    out.push(ch);
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

/// Parse a JSON object, retrying once with trailing commas removed.
pub fn parse_lenient_object(text: &str) -> Option<Map<String, Value>> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => {
            let repaired = strip_trailing_commas(text);
            if repaired == text {
                return None;
            }
            serde_json::from_str::<Value>(&repaired).ok()?
        }
    };

    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
