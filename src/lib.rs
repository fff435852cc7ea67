//! Agent Orchestrator - Rust Backend Library
//!
//! Orchestration core for LLM agents working inside a project workspace.
//! It includes:
//! - Admission control for concurrently running agents
//! - Agent launch, cancellation and lifecycle events
//! - Proposal classification, parsing and persistence
//! - Configuration storage, data models and utilities
//!
//! Tool call extraction lives in `agent-orchestrator-tools`; provider
//! configuration types live in `agent-orchestrator-core`.

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

// Re-export models (avoiding settings module conflict)
pub use models::response::*;
pub use models::settings::{ConfigUpdate, OrchestratorConfig};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
