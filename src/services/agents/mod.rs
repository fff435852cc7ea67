//! Agent Launching
//!
//! Gatekeeping and lifecycle tracking for background agents:
//! - `prerequisites` - launch precondition checks and id generation
//! - `runner` - the `AgentRunner` seam that actually drives an agent
//! - `registry` - per-agent status, cancellation and completion waiting
//! - `coordinator` - `AgentLaunchCoordinator` tying limiter, runner and
//!   proposal handling together

pub mod coordinator;
pub mod prerequisites;
pub mod registry;
pub mod runner;

use thiserror::Error;

use crate::utils::error::AppError;

pub use coordinator::{AgentLaunchCoordinator, LaunchDefaults};
pub use prerequisites::{generate_agent_id, validate_launch_prerequisites};
pub use registry::AgentRegistry;
pub use runner::{AgentContext, AgentRunner, TranscriptRunner};

/// Named launch failures, reported to the caller before any slot is taken
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LaunchError {
    #[error("Project root is required to launch an agent")]
    MissingProjectRoot,

    #[error("Provider configuration is required to launch an agent")]
    MissingProviderConfig,

    #[error("Provider configuration is incomplete: {0}")]
    IncompleteProviderConfig(String),

    #[error("Maximum concurrent agents reached ({current} of {max} running)")]
    LimitReached { max: u32, current: u32 },

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for LaunchError {
    fn from(err: AppError) -> Self {
        LaunchError::Internal(err.to_string())
    }
}

impl From<LaunchError> for String {
    fn from(err: LaunchError) -> String {
        err.to_string()
    }
}
