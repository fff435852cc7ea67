//! Settings Models
//!
//! Orchestrator configuration and partial update structures.

use serde::{Deserialize, Serialize};

use agent_orchestrator_tools::DEFAULT_CONTENT_PLACEHOLDER;

use crate::models::agent::PROPOSAL_GENERATOR_AGENT_TYPE;

/// Concurrent agent limit used when nothing is configured
pub const DEFAULT_MAX_CONCURRENT_AGENTS: u32 = 5;

/// Shortest text accepted as a proposal
pub const DEFAULT_PROPOSAL_MIN_LENGTH: usize = 100;

/// Orchestrator configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrchestratorConfig {
    /// Maximum number of agents running at once (0 disables launching)
    #[serde(default = "default_max_concurrent_agents")]
    pub max_concurrent_agents: u32,
    /// Minimum length of a proposal result
    #[serde(default = "default_proposal_min_length")]
    pub proposal_min_length: usize,
    /// Sentinel a model writes instead of repeating a code block
    #[serde(default = "default_content_placeholder")]
    pub content_placeholder: String,
    /// Agent type whose results are treated as proposals
    #[serde(default = "default_proposal_agent_type")]
    pub proposal_agent_type: String,
    /// Workspace used when a launch doesn't name one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_project_root: Option<String>,
}

fn default_max_concurrent_agents() -> u32 {
    DEFAULT_MAX_CONCURRENT_AGENTS
}

fn default_proposal_min_length() -> usize {
    DEFAULT_PROPOSAL_MIN_LENGTH
}

fn default_content_placeholder() -> String {
    DEFAULT_CONTENT_PLACEHOLDER.to_string()
}

fn default_proposal_agent_type() -> String {
    PROPOSAL_GENERATOR_AGENT_TYPE.to_string()
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_agents: default_max_concurrent_agents(),
            proposal_min_length: default_proposal_min_length(),
            content_placeholder: default_content_placeholder(),
            proposal_agent_type: default_proposal_agent_type(),
            default_project_root: None,
        }
    }
}

/// Partial configuration update
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigUpdate {
    pub max_concurrent_agents: Option<u32>,
    pub proposal_min_length: Option<usize>,
    pub content_placeholder: Option<String>,
    pub proposal_agent_type: Option<String>,
    pub default_project_root: Option<String>,
}

impl OrchestratorConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: ConfigUpdate) {
        if let Some(max) = update.max_concurrent_agents {
            self.max_concurrent_agents = max;
        }
        if let Some(min_length) = update.proposal_min_length {
            self.proposal_min_length = min_length;
        }
        if let Some(placeholder) = update.content_placeholder {
            self.content_placeholder = placeholder;
        }
        if let Some(agent_type) = update.proposal_agent_type {
            self.proposal_agent_type = agent_type;
        }
        if let Some(root) = update.default_project_root {
            self.default_project_root = if root.trim().is_empty() {
                None
            } else {
                Some(root)
            };
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.content_placeholder.trim().is_empty() {
            return Err("contentPlaceholder must not be empty".to_string());
        }
        if self.proposal_agent_type.trim().is_empty() {
            return Err("proposalAgentType must not be empty".to_string());
        }
        Ok(())
    }
}
