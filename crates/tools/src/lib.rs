//! Agent Orchestrator Tools
//!
//! Recognition side of tool calling: everything needed to turn streamed LLM
//! text into structured tool call records. Execution of the calls lives
//! outside this crate.
//!
//! - `ToolCallCandidate` - extracted tool call record
//! - `ToolCallExtractor` - multi-pass, overlap-free extractor
//! - `ToolCallDeduplicator` - skip-id to canonical-id table
//! - `StreamSession` - per-agent cumulative text + candidates + dedup table

pub mod candidate;
pub mod dedup;
pub mod extractor;
mod fence;
pub mod lenient_json;
pub mod session;

// Re-export core types
pub use candidate::{
    CandidateStatus, ExtractionResult, SourceSpan, ToolCallCandidate, STREAMING_TOOL_ID,
};
pub use dedup::ToolCallDeduplicator;
pub use extractor::{
    extract_tool_calls, strip_tool_calls, ToolCallExtractor, DEFAULT_CONTENT_PLACEHOLDER,
};
pub use session::StreamSession;
