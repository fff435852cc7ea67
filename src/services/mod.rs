//! Services
//!
//! Business logic services for the application.
//! Services handle the core functionality and are called by commands.

pub mod agents;
pub mod limiter;
pub mod proposal;

pub use agents::{
    AgentContext, AgentLaunchCoordinator, AgentRegistry, AgentRunner, LaunchDefaults,
    LaunchError, TranscriptRunner,
};
pub use limiter::{
    AgentResourceLimiter, Admission, LaunchValidation, LimiterStats, ResourceLimits,
    SharedLimiter,
};
pub use proposal::{
    FileProposalStore, MarkdownProposalParser, MemoryProposalStore, ProposalError,
    ProposalParser, ProposalResultClassifier, ProposalSettings, ProposalStore,
};
