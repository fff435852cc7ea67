//! Proposal Handling
//!
//! Turning a proposal-generator agent's Markdown answer into a persisted
//! change proposal. The classifier decides and orchestrates; parsing and
//! persistence sit behind the `ProposalParser` and `ProposalStore` traits.

pub mod classifier;
pub mod parser;
pub mod store;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::proposal::{ProposalDraft, ProposalRecord};
use crate::utils::error::AppResult;

pub use classifier::{ProposalResultClassifier, ProposalSettings};
pub use parser::MarkdownProposalParser;
pub use store::{FileProposalStore, MemoryProposalStore};

/// Message used when the parser finds no proposal in the text
pub const PARSE_FAILED_MESSAGE: &str = "Failed to parse proposal from Markdown";

/// Why a result could not become a proposal
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProposalError {
    #[error("Result is empty")]
    EmptyInput,

    #[error("Result is too short to be a valid proposal")]
    TooShort,

    #[error("Result does not appear to be a valid proposal format")]
    MissingStructure,

    /// Parser found nothing, or failed with its own message
    #[error("{}", .0.as_deref().unwrap_or(PARSE_FAILED_MESSAGE))]
    ParseFailed(Option<String>),

    /// Store failure, message kept as reported
    #[error("{0}")]
    PersistFailed(String),
}

/// Converts Markdown into a proposal draft
pub trait ProposalParser: Send + Sync {
    /// `Ok(None)` when the text holds no recognizable proposal
    fn parse_proposal_from_markdown(&self, markdown: &str) -> AppResult<Option<ProposalDraft>>;
}

/// Persists proposals and surfaces them for review
#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn create_proposal(
        &self,
        project_root: &Path,
        draft: ProposalDraft,
        source_agent_id: Option<&str>,
    ) -> AppResult<ProposalRecord>;

    /// Ask the UI to show the review dialog for a new proposal
    async fn open_review_modal(&self, proposal: &ProposalRecord) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failed_messages() {
        assert_eq!(
            ProposalError::ParseFailed(None).to_string(),
            "Failed to parse proposal from Markdown"
        );
        assert_eq!(
            ProposalError::ParseFailed(Some("bad heading".into())).to_string(),
            "bad heading"
        );
    }

    #[test]
    fn test_persist_failed_is_verbatim() {
        let err = ProposalError::PersistFailed("disk full".into());
        assert_eq!(err.to_string(), "disk full");
    }
}
