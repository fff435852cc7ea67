//! Agent Orchestrator Core
//!
//! Foundational error types and provider configuration for the agent
//! orchestrator workspace. This crate has zero dependencies on application
//! level code (agent registry, proposal storage, runners).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `provider` - LLM provider configuration and its backend form
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/thiserror** - keeps build times minimal
//! 2. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod provider;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Provider Types ─────────────────────────────────────────────────────
pub use provider::{convert_provider_config_to_backend, BackendConfig, ProviderConfig};
