//! Proposal Result Classifier
//!
//! Decides whether a finished agent's answer is a change proposal, checks
//! that it looks like one, and turns it into a stored proposal. Failures of
//! the parser or store come back as a `ProposalHandleResult`, never as an
//! error crossing this boundary.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{info, warn};

use crate::models::agent::PROPOSAL_GENERATOR_AGENT_TYPE;
use crate::models::proposal::{ProposalHandleResult, ProposalRecord, ProposalValidation};
use crate::models::settings::{OrchestratorConfig, DEFAULT_PROPOSAL_MIN_LENGTH};
use crate::services::proposal::{
    MarkdownProposalParser, ProposalError, ProposalParser, ProposalStore,
};

/// Section headings that mark a proposal (levels 1-3, any case)
fn structure_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?im)^\s{0,3}#{1,3}\s+(why|rationale|what changes|changes|impact)\b").ok()
        })
        .as_ref()
}

/// Classifier settings
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalSettings {
    /// Agent type whose results are proposals
    pub agent_type: String,
    /// Shortest accepted result, in characters
    pub min_length: usize,
}

impl Default for ProposalSettings {
    fn default() -> Self {
        Self {
            agent_type: PROPOSAL_GENERATOR_AGENT_TYPE.to_string(),
            min_length: DEFAULT_PROPOSAL_MIN_LENGTH,
        }
    }
}

impl From<&OrchestratorConfig> for ProposalSettings {
    fn from(config: &OrchestratorConfig) -> Self {
        Self {
            agent_type: config.proposal_agent_type.clone(),
            min_length: config.proposal_min_length,
        }
    }
}

pub struct ProposalResultClassifier {
    settings: ProposalSettings,
    parser: Arc<dyn ProposalParser>,
    store: Arc<dyn ProposalStore>,
}

impl ProposalResultClassifier {
    pub fn new(
        settings: ProposalSettings,
        parser: Arc<dyn ProposalParser>,
        store: Arc<dyn ProposalStore>,
    ) -> Self {
        Self {
            settings,
            parser,
            store,
        }
    }

    /// Classifier using the Markdown parser and the given store
    pub fn with_store(settings: ProposalSettings, store: Arc<dyn ProposalStore>) -> Self {
        Self::new(settings, Arc::new(MarkdownProposalParser::new()), store)
    }

    pub fn settings(&self) -> &ProposalSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn ProposalStore> {
        &self.store
    }

    /// Routing check: the agent is the proposal role and produced some text
    pub fn should_handle_proposal_result(&self, agent_type: &str, result: Option<&str>) -> bool {
        agent_type == self.settings.agent_type
            && result.is_some_and(|text| !text.trim().is_empty())
    }

    /// Typed form of [`Self::validate_proposal_result`]
    pub fn check_proposal_result(&self, text: &str) -> Result<(), ProposalError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ProposalError::EmptyInput);
        }
        if trimmed.chars().count() < self.settings.min_length {
            return Err(ProposalError::TooShort);
        }
        let structured = structure_regex().is_some_and(|re| re.is_match(trimmed));
        if !structured {
            return Err(ProposalError::MissingStructure);
        }
        Ok(())
    }

    pub fn validate_proposal_result(&self, text: &str) -> ProposalValidation {
        match self.check_proposal_result(text) {
            Ok(()) => ProposalValidation {
                valid: true,
                error: None,
            },
            Err(e) => ProposalValidation {
                valid: false,
                error: Some(e.to_string()),
            },
        }
    }

    /// Parse and persist a proposal, keeping collaborator messages intact
    pub async fn process_proposal_result(
        &self,
        markdown: &str,
        agent_id: &str,
        project_root: &Path,
    ) -> Result<ProposalRecord, ProposalError> {
        let draft = self
            .parser
            .parse_proposal_from_markdown(markdown)
            .map_err(|e| ProposalError::ParseFailed(Some(e.message())))?
            .ok_or(ProposalError::ParseFailed(None))?;

        let record = self
            .store
            .create_proposal(project_root, draft, Some(agent_id))
            .await
            .map_err(|e| ProposalError::PersistFailed(e.message()))?;

        self.store
            .open_review_modal(&record)
            .await
            .map_err(|e| ProposalError::PersistFailed(e.message()))?;

        Ok(record)
    }

    /// Parse, persist and report a proposal-generator result
    pub async fn handle_proposal_generator_result(
        &self,
        markdown: &str,
        agent_id: &str,
        project_root: &Path,
    ) -> ProposalHandleResult {
        match self
            .process_proposal_result(markdown, agent_id, project_root)
            .await
        {
            Ok(record) => {
                info!(
                    agent_id = %agent_id,
                    proposal_id = %record.id,
                    "[Proposal] Created from agent result"
                );
                ProposalHandleResult::created(record.id)
            }
            Err(e) => {
                warn!(agent_id = %agent_id, "[Proposal] Not created: {}", e);
                ProposalHandleResult::failed(e.to_string())
            }
        }
    }
}
