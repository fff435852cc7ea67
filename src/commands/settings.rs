//! Settings Commands
//!
//! Commands for reading and updating the orchestrator configuration.

use serde_json::{Map, Value};

use agent_orchestrator_core::{convert_provider_config_to_backend, ProviderConfig};

use crate::models::response::CommandResponse;
use crate::models::settings::{ConfigUpdate, OrchestratorConfig};
use crate::state::AppState;

/// Get the current configuration
pub async fn get_settings(state: &AppState) -> CommandResponse<OrchestratorConfig> {
    CommandResponse::ok(state.get_config().await)
}

/// Update the configuration with a partial update
pub async fn update_settings(
    state: &AppState,
    update: ConfigUpdate,
) -> CommandResponse<OrchestratorConfig> {
    state.update_config(update).await.into()
}

/// Select the provider used by launches without an override
pub async fn set_provider_config(
    state: &AppState,
    provider: Option<ProviderConfig>,
) -> CommandResponse<()> {
    state.set_provider_config(provider).await;
    CommandResponse::ok(())
}

/// Backend form of a provider config object (legacy aliases added)
pub fn convert_provider_config(config: Map<String, Value>) -> CommandResponse<Map<String, Value>> {
    CommandResponse::ok(convert_provider_config_to_backend(&config))
}
