//! Agent Models
//!
//! Data structures for launching agents and tracking their lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agent_orchestrator_core::ProviderConfig;

/// Agent type whose final answer is a change proposal
pub const PROPOSAL_GENERATOR_AGENT_TYPE: &str = "proposal-generator";

/// Lifecycle status of a launched agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Running,
    Completed,
    Failed(String),
    Cancelled,
}

impl AgentStatus {
    /// Whether the agent has stopped for good
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentStatus::Completed | AgentStatus::Failed(_) | AgentStatus::Cancelled
        )
    }
}

/// Request to start an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    /// Agent role (e.g. "explore", "proposal-generator")
    pub agent_type: String,
    /// Task description handed to the agent
    pub initial_prompt: String,
    /// Chat message the agent's output is attached to
    #[serde(default)]
    pub target_message_id: Option<String>,
    /// Provider to use instead of the workspace default
    #[serde(default)]
    pub provider_config_override: Option<ProviderConfig>,
}

impl LaunchRequest {
    pub fn new(agent_type: impl Into<String>, initial_prompt: impl Into<String>) -> Self {
        Self {
            agent_type: agent_type.into(),
            initial_prompt: initial_prompt.into(),
            target_message_id: None,
            provider_config_override: None,
        }
    }

    pub fn with_target_message(mut self, message_id: impl Into<String>) -> Self {
        self.target_message_id = Some(message_id.into());
        self
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider_config_override = Some(provider);
        self
    }
}

/// Snapshot of a launched agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub id: String,
    pub agent_type: String,
    pub status: AgentStatus,
    pub target_message_id: Option<String>,
    pub project_root: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Lifecycle event broadcast to UI consumers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Started {
        agent_id: String,
        agent_type: String,
    },
    Completed {
        agent_id: String,
        output: String,
    },
    Failed {
        agent_id: String,
        error: String,
    },
    Cancelled {
        agent_id: String,
    },
    ProposalCreated {
        agent_id: String,
        proposal_id: String,
    },
    ProposalRejected {
        agent_id: String,
        error: String,
    },
}

impl AgentEvent {
    pub fn agent_id(&self) -> &str {
        match self {
            AgentEvent::Started { agent_id, .. }
            | AgentEvent::Completed { agent_id, .. }
            | AgentEvent::Failed { agent_id, .. }
            | AgentEvent::Cancelled { agent_id }
            | AgentEvent::ProposalCreated { agent_id, .. }
            | AgentEvent::ProposalRejected { agent_id, .. } => agent_id,
        }
    }
}
