//! Code Fence Scanner
//!
//! Splits text into ```-delimited regions. Fences pair up left to right and
//! a delimiter must start its line (up to three spaces of indentation).
//! A fence whose body is a complete JSON object with a `"tool"` key is
//! closed by brace matching rather than by the next delimiter, so a tool
//! call whose `content` argument embeds its own fences stays intact.

use crate::lenient_json::find_matching_brace;

pub(crate) const FENCE: &str = "```";

const TOOL_KEY: &str = "\"tool\"";

/// Indentation a fence delimiter may carry (CommonMark allows three spaces)
const MAX_FENCE_INDENT: usize = 3;

/// One fenced region of the scanned text (byte offsets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Fence {
    /// Offset of the opening backticks
    pub start: usize,
    pub body_start: usize,
    pub body_end: usize,
    /// Offset just past the closing backticks (or end of text when open)
    pub end: usize,
    pub closed: bool,
}

impl Fence {
    pub fn body<'a>(&self, text: &'a str) -> &'a str {
        &text[self.body_start..self.body_end]
    }

    /// Whether the body's outer shape is a tool-call JSON object.
    pub fn is_tool_shaped(&self, text: &str) -> bool {
        let body = self.body(text).trim();
        body.starts_with('{') && body.ends_with('}') && body.contains(TOOL_KEY)
    }

    /// Whether the body mentions a tool key at all (used for open fences).
    pub fn mentions_tool(&self, text: &str) -> bool {
        self.body(text).contains(TOOL_KEY)
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Treat an unterminated fence as closed at the end of the text.
    pub fn close_at_end(&mut self, text_len: usize) {
        self.body_end = text_len;
        self.end = text_len;
        self.closed = true;
    }
}

fn is_language_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.' | '#')
}

/// Whether `pos` begins a line, allowing up to three spaces of indentation.
fn starts_line(text: &str, pos: usize) -> bool {
    let line_start = text[..pos].rfind('\n').map_or(0, |nl| nl + 1);
    let indent = &text[line_start..pos];
    indent.len() <= MAX_FENCE_INDENT && indent.bytes().all(|b| b == b' ')
}

/// Byte offset of the first line-starting `FENCE` at `from` or later.
fn find_line_start_fence(text: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(rel) = text[search..].find(FENCE) {
        let pos = search + rel;
        if starts_line(text, pos) {
            return Some(pos);
        }
        search = pos + FENCE.len();
    }
    None
}

/// Scan every fence in `text`, left to right.
///
/// Delimiters count only at the start of a line, so backticks inside a
/// JSON string never open or close a fence. Only the last fence can be
/// unclosed.
pub(crate) fn scan_fences(text: &str) -> Vec<Fence> {
    let mut fences = Vec::new();
    let mut cursor = 0;

    while let Some(start) = find_line_start_fence(text, cursor) {
        let after_ticks = start + FENCE.len();
        let language_len = text[after_ticks..]
            .find(|c: char| !is_language_char(c))
            .unwrap_or(text.len() - after_ticks);
        let body_start = after_ticks + language_len;

        let rest = &text[body_start..];
        let first = body_start + (rest.len() - rest.trim_start().len());
        let mut search_from = body_start;

        // A tool object is closed by brace matching, whatever its key order.
        if let Some(object_end) = tool_object_end(text, first) {
            let after = &text[object_end..];
            let gap = after.len() - after.trim_start().len();
            if after[gap..].starts_with(FENCE) {
                let end = object_end + gap + FENCE.len();
                fences.push(Fence {
                    start,
                    body_start,
                    body_end: object_end + gap,
                    end,
                    closed: true,
                });
                cursor = end;
                continue;
            }
            search_from = object_end;
        }

        // A raw newline can't occur inside a JSON string, so a fence at the
        // start of a line really closes the block.
        match find_line_start_fence(text, search_from) {
            Some(close_at) => {
                let end = close_at + FENCE.len();
                fences.push(Fence {
                    start,
                    body_start,
                    body_end: close_at,
                    end,
                    closed: true,
                });
                cursor = end;
            }
            None => {
                fences.push(Fence {
                    start,
                    body_start,
                    body_end: text.len(),
                    end: text.len(),
                    closed: false,
                });
                break;
            }
        }
    }

    fences
}

/// End (exclusive) of a complete JSON object at `open` that has a tool key.
fn tool_object_end(text: &str, open: usize) -> Option<usize> {
    let close = find_matching_brace(text, open)?;
    text[open..=close].contains(TOOL_KEY).then_some(close + 1)
}
