//! Tool Call Extractor
//!
//! Turns the cumulative text of a streaming LLM response into tool call
//! candidates. The extractor is stateless per call and never fails:
//! anything it cannot parse is skipped.
//!
//! Passes, in priority order (earlier passes claim spans first):
//! - Pass 1: fenced blocks whose body is a `{"tool": ...}` object
//! - Pass 2: placeholder `content` replaced by the preceding code block
//! - Pass 3: bare `{"tool": ...}` objects outside every fence
//! - Pass 4: one `Partial` candidate for a trailing, unterminated tool fence

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::candidate::{
    CandidateStatus, ExtractionResult, SourceSpan, ToolCallCandidate, STREAMING_TOOL_ID,
};
use crate::fence::{scan_fences, Fence};
use crate::lenient_json::{find_matching_brace, parse_lenient_object};

/// Default sentinel a model writes instead of repeating a large file body.
pub const DEFAULT_CONTENT_PLACEHOLDER: &str = "<<PLACEHOLDER>>";

/// Opening of a bare JSON tool call, whitespace-tolerant.
fn bare_tool_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"\{\s*"tool"\s*:"#).ok())
        .as_ref()
}

/// Tool name inside a possibly unterminated object.
fn tool_name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#""tool"\s*:\s*"([^"\\]*)""#).ok())
        .as_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamPhase {
    /// More text may still arrive
    Streaming,
    /// The response is complete
    Finished,
}

/// Spans accepted so far in one extraction pass.
#[derive(Debug, Default)]
struct ClaimedSpans(Vec<SourceSpan>);

impl ClaimedSpans {
    fn overlaps(&self, span: &SourceSpan) -> bool {
        self.0.iter().any(|claimed| claimed.overlaps(span))
    }

    fn contains(&self, pos: usize) -> bool {
        self.0.iter().any(|claimed| claimed.contains(pos))
    }

    /// Claim `span` unless it overlaps an earlier claim.
    fn try_claim(&mut self, span: SourceSpan) -> bool {
        if self.overlaps(&span) {
            return false;
        }
        self.0.push(span);
        true
    }
}

/// Stateless tool call extractor.
#[derive(Debug, Clone)]
pub struct ToolCallExtractor {
    placeholder: String,
}

impl Default for ToolCallExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_PLACEHOLDER)
    }
}

impl ToolCallExtractor {
    /// Create an extractor that substitutes `placeholder` content values.
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Extract candidates from text that may still be growing.
    ///
    /// Re-running on a longer prefix reproduces every complete candidate
    /// found earlier, with the same span and id.
    pub fn extract(&self, text: &str) -> ExtractionResult {
        self.run(text, StreamPhase::Streaming)
    }

    /// Extract candidates from a finished response.
    ///
    /// An unterminated trailing fence is treated as closed by the end of
    /// the text, and no `Partial` candidate is produced.
    pub fn extract_final(&self, text: &str) -> ExtractionResult {
        self.run(text, StreamPhase::Finished)
    }

    fn run(&self, text: &str, phase: StreamPhase) -> ExtractionResult {
        let mut fences = scan_fences(text);
        if phase == StreamPhase::Finished {
            if let Some(last) = fences.last_mut().filter(|f| !f.closed) {
                last.close_at_end(text.len());
            }
        }

        let mut claimed = ClaimedSpans::default();
        let mut calls = Vec::new();

        // Pass 1: fenced tool calls
        for fence in fences
            .iter()
            .filter(|f| f.closed && f.is_tool_shaped(text))
        {
            let span = SourceSpan::new(fence.start, fence.end);
            if let Some(candidate) = build_candidate(text, span, fence.body(text).trim()) {
                if claimed.try_claim(span) {
                    calls.push(candidate);
                }
            } else {
                debug!(start = span.start, "[Extractor] Skipping unparseable tool fence");
            }
        }

        // Pass 3: bare JSON outside every fence (open fences included)
        if let Some(pattern) = bare_tool_pattern() {
            for m in pattern.find_iter(text) {
                let start = m.start();
                if fences.iter().any(|f| f.contains(start)) || claimed.contains(start) {
                    continue;
                }
                let Some(close) = find_matching_brace(text, start) else {
                    continue;
                };
                let span = SourceSpan::new(start, close + 1);
                if claimed.overlaps(&span) {
                    continue;
                }
                if let Some(candidate) = build_candidate(text, span, &text[span.range()]) {
                    claimed.try_claim(span);
                    calls.push(candidate);
                }
            }
        }

        // Pass 2: placeholder substitution
        for candidate in &mut calls {
            self.substitute_placeholder(text, &fences, candidate);
        }

        // Pass 4: trailing partial
        if phase == StreamPhase::Streaming {
            if let Some(partial) = trailing_partial(text, &fences, &claimed) {
                calls.push(partial);
            }
        }

        calls.sort_by_key(|c| c.source_span.start);
        ExtractionResult { tool_calls: calls }
    }

    fn substitute_placeholder(&self, text: &str, fences: &[Fence], candidate: &mut ToolCallCandidate) {
        let is_placeholder = candidate
            .argument_str("content")
            .map_or(false, |content| content == self.placeholder);
        if !is_placeholder {
            return;
        }

        let code_block = fences
            .iter()
            .filter(|f| f.closed && f.end <= candidate.source_span.start)
            .filter(|f| !f.is_tool_shaped(text))
            .last();

        match code_block {
            Some(fence) => {
                let body = fence.body(text).trim().to_string();
                candidate
                    .arguments
                    .insert("content".to_string(), Value::String(body));
            }
            None => {
                warn!(
                    id = %candidate.id,
                    tool = %candidate.tool,
                    "[Extractor] Placeholder content has no preceding code block"
                );
                candidate.placeholder_unresolved = true;
            }
        }
    }
}

/// Extract with the default placeholder sentinel.
pub fn extract_tool_calls(text: &str) -> ExtractionResult {
    ToolCallExtractor::default().extract(text)
}

/// Parse `body` into a pending candidate covering `span`.
///
/// Requires a non-empty string `tool` and an object under `arguments`
/// (or its `args` alias).
fn build_candidate(text: &str, span: SourceSpan, body: &str) -> Option<ToolCallCandidate> {
    let mut object = parse_lenient_object(body)?;

    let tool = object.get("tool")?.as_str()?.trim().to_string();
    if tool.is_empty() {
        return None;
    }

    let arguments = match object.remove("arguments").or_else(|| object.remove("args"))? {
        Value::Object(map) => map,
        _ => return None,
    };

    Some(ToolCallCandidate {
        id: ToolCallCandidate::id_for_span(span),
        tool,
        arguments,
        source_span: span,
        raw_text: text[span.range()].to_string(),
        status: CandidateStatus::Pending,
        placeholder_unresolved: false,
    })
}

/// Synthetic candidate for a tool fence the stream hasn't finished.
fn trailing_partial(text: &str, fences: &[Fence], claimed: &ClaimedSpans) -> Option<ToolCallCandidate> {
    let open = fences.last().filter(|f| !f.closed)?;
    let tail = SourceSpan::new(open.start, text.len());
    if tail.is_empty() || claimed.overlaps(&tail) || !open.mentions_tool(text) {
        return None;
    }

    let tool = tool_name_pattern()
        .and_then(|p| p.captures(open.body(text)))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    Some(ToolCallCandidate {
        id: STREAMING_TOOL_ID.to_string(),
        tool,
        arguments: Map::new(),
        source_span: tail,
        raw_text: text[tail.range()].to_string(),
        status: CandidateStatus::Partial,
        placeholder_unresolved: false,
    })
}

/// Remove every candidate's source text, leaving the surrounding prose.
pub fn strip_tool_calls(text: &str, candidates: &[ToolCallCandidate]) -> String {
    let mut spans: Vec<SourceSpan> = candidates
        .iter()
        .map(|c| c.source_span)
        .filter(|s| s.end <= text.len() && text.is_char_boundary(s.start) && text.is_char_boundary(s.end))
        .collect();
    spans.sort_by_key(|s| s.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in spans {
        if span.start < cursor {
            continue;
        }
        out.push_str(&text[cursor..span.start]);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out.trim().to_string()
}
