//! Proposal Models
//!
//! Structured change proposals produced by the proposal-generator agent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a proposal lives in its lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProposalLocation {
    Proposals,
    Changes,
    Archive,
}

impl ProposalLocation {
    pub const ALL: [ProposalLocation; 3] = [
        ProposalLocation::Proposals,
        ProposalLocation::Changes,
        ProposalLocation::Archive,
    ];

    /// Directory name for this location
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalLocation::Proposals => "proposals",
            ProposalLocation::Changes => "changes",
            ProposalLocation::Archive => "archive",
        }
    }
}

/// Review status of a proposal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Draft,
    Review,
    Approved,
    Rejected,
}

/// Scope of a proposed change
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalImpact {
    pub specs: Vec<String>,
    pub files: Vec<String>,
    pub breaking_changes: bool,
}

/// One implementation task of a proposal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub done: bool,
}

/// Proposal content as parsed from an agent's Markdown answer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    pub title: String,
    /// Rationale section
    pub why: String,
    /// Change list, one entry per bullet
    pub what_changes: Vec<String>,
    pub impact: ProposalImpact,
    pub tasks: Vec<ProposalTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design: Option<String>,
}

/// A persisted proposal
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRecord {
    pub id: String,
    /// Path relative to the project root
    pub path: String,
    pub status: ProposalStatus,
    pub location: ProposalLocation,
    #[serde(flatten)]
    pub document: ProposalDraft,
    /// Agent whose result produced this proposal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_agent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Index entry for listing proposals without loading them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalIndexItem {
    pub id: String,
    pub title: String,
    pub status: ProposalStatus,
    pub location: ProposalLocation,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ProposalRecord> for ProposalIndexItem {
    fn from(record: &ProposalRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.document.title.clone(),
            status: record.status,
            location: record.location,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Proposal index of one location
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalIndex {
    pub proposals: Vec<ProposalIndexItem>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Outcome of the cheap proposal format check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of handling a proposal-generator result, reported to the chat layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalHandleResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProposalHandleResult {
    pub fn created(proposal_id: impl Into<String>) -> Self {
        Self {
            success: true,
            proposal_id: Some(proposal_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            proposal_id: None,
            error: Some(error.into()),
        }
    }
}
