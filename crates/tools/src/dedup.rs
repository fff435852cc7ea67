//! Tool Call Deduplication
//!
//! When a retry or resumption re-emits a logical tool call under a new id,
//! the executor records `skip id -> canonical id` here and looks ids up
//! before acting on completion or cancellation events. One instance per
//! agent session; instances are never shared.

use std::collections::HashMap;

use tracing::debug;

/// Skip-id to canonical-id correction table for one agent session.
#[derive(Debug, Clone, Default)]
pub struct ToolCallDeduplicator {
    duplicates: HashMap<String, String>,
}

impl ToolCallDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `skip_id` should be treated as `canonical_id`.
    ///
    /// An existing mapping for `skip_id` is replaced.
    pub fn add_duplicate(&mut self, skip_id: impl Into<String>, canonical_id: impl Into<String>) {
        let skip_id = skip_id.into();
        let canonical_id = canonical_id.into();
        debug!(skip_id = %skip_id, canonical_id = %canonical_id, "[Dedup] Recording duplicate tool call");
        self.duplicates.insert(skip_id, canonical_id);
    }

    /// Canonical id for `skip_id`, or `None` when no correction is needed.
    pub fn get_canonical_id(&self, skip_id: &str) -> Option<&str> {
        self.duplicates.get(skip_id).map(String::as_str)
    }

    /// The id to act on: the canonical id if one is recorded, else `id`.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.get_canonical_id(id).unwrap_or(id)
    }

    /// Drop every mapping. Safe on an empty table.
    pub fn clear_all(&mut self) {
        self.duplicates.clear();
    }

    pub fn len(&self) -> usize {
        self.duplicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
    }
}
