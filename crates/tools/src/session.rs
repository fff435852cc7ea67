//! Per-Agent Stream Session
//!
//! Holds the cumulative response text of one agent, the current candidate
//! list and the agent's deduplication table. Each chunk triggers a full
//! re-extraction; the candidate list is replaced, so a `Partial` entry is
//! superseded by the complete candidate once its JSON finishes streaming.

use std::collections::HashSet;

use tracing::debug;

use crate::candidate::ToolCallCandidate;
use crate::dedup::ToolCallDeduplicator;
use crate::extractor::{strip_tool_calls, ToolCallExtractor};

/// Streaming state for a single agent.
#[derive(Debug, Clone, Default)]
pub struct StreamSession {
    extractor: ToolCallExtractor,
    text: String,
    candidates: Vec<ToolCallCandidate>,
    emitted: HashSet<String>,
    deduplicator: ToolCallDeduplicator,
    finished: bool,
}

impl StreamSession {
    pub fn new(extractor: ToolCallExtractor) -> Self {
        Self {
            extractor,
            ..Self::default()
        }
    }

    /// Append a chunk and re-extract.
    ///
    /// Returns the complete candidates first seen in this chunk.
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<ToolCallCandidate> {
        if self.finished {
            debug!("[StreamSession] Ignoring chunk after finish");
            return Vec::new();
        }
        self.text.push_str(chunk);
        self.candidates = self.extractor.extract(&self.text).tool_calls;
        self.take_new()
    }

    /// Mark the stream complete and run the final extraction.
    ///
    /// Returns the complete candidates not reported before.
    pub fn finish(&mut self) -> Vec<ToolCallCandidate> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;
        self.candidates = self.extractor.extract_final(&self.text).tool_calls;
        self.take_new()
    }

    fn take_new(&mut self) -> Vec<ToolCallCandidate> {
        let fresh: Vec<ToolCallCandidate> = self
            .candidates
            .iter()
            .filter(|c| !c.is_partial() && !self.emitted.contains(&c.id))
            .cloned()
            .collect();
        for candidate in &fresh {
            self.emitted.insert(candidate.id.clone());
        }
        fresh
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current candidates, ordered by position, including a trailing partial.
    pub fn candidates(&self) -> &[ToolCallCandidate] {
        &self.candidates
    }

    /// The in-flight tool call, if the stream is inside one.
    pub fn streaming_candidate(&self) -> Option<&ToolCallCandidate> {
        self.candidates.iter().find(|c| c.is_partial())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Response text without tool call blocks.
    pub fn prose(&self) -> String {
        strip_tool_calls(&self.text, &self.candidates)
    }

    pub fn deduplicator(&self) -> &ToolCallDeduplicator {
        &self.deduplicator
    }

    pub fn deduplicator_mut(&mut self) -> &mut ToolCallDeduplicator {
        &mut self.deduplicator
    }

    /// The id an executor event should be applied to.
    pub fn resolve_id<'a>(&'a self, id: &'a str) -> &'a str {
        self.deduplicator.resolve(id)
    }

    /// Start a new, independent session with the same extractor.
    pub fn reset(&mut self) {
        self.text.clear();
        self.candidates.clear();
        self.emitted.clear();
        self.deduplicator.clear_all();
        self.finished = false;
    }
}
