//! Tool Call Candidate Types
//!
//! Structured records produced by the extractor for the external executor.

use std::ops::Range;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use agent_orchestrator_core::{CoreError, CoreResult};

/// Id carried by the synthetic candidate that signals an in-flight tool call.
pub const STREAMING_TOOL_ID: &str = "streaming-tool";

/// Whether a candidate is actionable or still being streamed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    /// Complete tool call awaiting execution
    Pending,
    /// Unterminated tool call; arguments are empty
    Partial,
}

/// Half-open byte range `[start, end)` into the extracted text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two spans share at least one byte.
    pub fn overlaps(&self, other: &SourceSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A tool call recognized in LLM output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallCandidate {
    /// Stable for a given span: `call_<start>_<end>`, or `streaming-tool`
    pub id: String,
    /// Trimmed tool name
    pub tool: String,
    pub arguments: Map<String, Value>,
    pub source_span: SourceSpan,
    /// Exact substring the candidate was extracted from
    pub raw_text: String,
    pub status: CandidateStatus,
    /// Set when `content` still holds the placeholder sentinel because no
    /// preceding code block could be substituted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub placeholder_unresolved: bool,
}

impl ToolCallCandidate {
    /// Build the id for a complete candidate at the given span.
    pub fn id_for_span(span: SourceSpan) -> String {
        format!("call_{}_{}", span.start, span.end)
    }

    pub fn is_partial(&self) -> bool {
        self.status == CandidateStatus::Partial
    }

    /// String value of an argument, if present and a string.
    pub fn argument_str(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(Value::as_str)
    }

    /// Deserialize the arguments into a typed argument struct.
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> CoreResult<T> {
        if self.is_partial() {
            return Err(CoreError::StillStreaming(self.tool.clone()));
        }
        serde_json::from_value(Value::Object(self.arguments.clone()))
            .map_err(|e| CoreError::invalid_arguments(&self.tool, e))
    }
}

/// Output of one extraction pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Candidates ordered by span start
    pub tool_calls: Vec<ToolCallCandidate>,
}

impl ExtractionResult {
    /// Complete (non-partial) candidates.
    pub fn complete(&self) -> impl Iterator<Item = &ToolCallCandidate> {
        self.tool_calls.iter().filter(|c| !c.is_partial())
    }

    /// Whether a tool call is currently being streamed.
    pub fn has_partial(&self) -> bool {
        self.tool_calls.iter().any(ToolCallCandidate::is_partial)
    }

    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tool_calls.len()
    }
}
