//! Launch Prerequisites
//!
//! Checks that must pass before an agent takes a limiter slot.

use uuid::Uuid;

use agent_orchestrator_core::ProviderConfig;

use super::LaunchError;

/// Validate the workspace and provider for a launch.
///
/// The project root is checked first, so a launch missing both reports
/// `MissingProjectRoot`.
pub fn validate_launch_prerequisites(
    project_root: Option<&str>,
    provider_config: Option<&ProviderConfig>,
) -> Result<(), LaunchError> {
    match project_root {
        Some(root) if !root.trim().is_empty() => {}
        _ => return Err(LaunchError::MissingProjectRoot),
    }

    let provider = provider_config.ok_or(LaunchError::MissingProviderConfig)?;
    provider
        .validate()
        .map_err(|e| LaunchError::IncompleteProviderConfig(e.to_string()))?;
    Ok(())
}

/// Generate a random v4 agent id (8-4-4-4-12 lowercase hex)
pub fn generate_agent_id() -> String {
    Uuid::new_v4().to_string()
}
