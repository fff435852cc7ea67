//! Application State
//!
//! Owns the configuration and the services built from it: one limiter per
//! process, the launch coordinator, and the file proposal store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use agent_orchestrator_core::ProviderConfig;

use crate::models::settings::{ConfigUpdate, OrchestratorConfig};
use crate::services::agents::{AgentLaunchCoordinator, AgentRunner, LaunchDefaults};
use crate::services::limiter::{ResourceLimits, SharedLimiter};
use crate::services::proposal::{FileProposalStore, ProposalResultClassifier, ProposalSettings};
use crate::storage::ConfigService;
use crate::utils::error::AppResult;

pub struct AppState {
    config: Arc<RwLock<ConfigService>>,
    limiter: SharedLimiter,
    coordinator: Arc<AgentLaunchCoordinator>,
    proposal_store: Arc<FileProposalStore>,
}

fn limits_from(config: &OrchestratorConfig) -> ResourceLimits {
    ResourceLimits {
        max_concurrent_agents: config.max_concurrent_agents,
    }
}

impl AppState {
    /// Build every service from a loaded configuration
    pub fn new(config: ConfigService, runner: Arc<dyn AgentRunner>) -> Self {
        let current = config.get_config().clone();
        let limiter = SharedLimiter::new(limits_from(&current));
        let proposal_store = Arc::new(FileProposalStore::new());
        let classifier = Arc::new(ProposalResultClassifier::with_store(
            ProposalSettings::from(&current),
            proposal_store.clone(),
        ));
        let coordinator = Arc::new(AgentLaunchCoordinator::new(
            limiter.clone(),
            runner,
            classifier,
            LaunchDefaults {
                project_root: current.default_project_root.clone(),
                provider_config: None,
                content_placeholder: current.content_placeholder.clone(),
            },
        ));

        Self {
            config: Arc::new(RwLock::new(config)),
            limiter,
            coordinator,
            proposal_store,
        }
    }

    /// Load `~/.agent-orchestrator/config.json` and build the services
    pub fn from_default_config(runner: Arc<dyn AgentRunner>) -> AppResult<Self> {
        Ok(Self::new(ConfigService::new()?, runner))
    }

    pub fn limiter(&self) -> &SharedLimiter {
        &self.limiter
    }

    pub fn coordinator(&self) -> &Arc<AgentLaunchCoordinator> {
        &self.coordinator
    }

    pub fn proposal_store(&self) -> &Arc<FileProposalStore> {
        &self.proposal_store
    }

    pub async fn get_config(&self) -> OrchestratorConfig {
        self.config.read().await.get_config().clone()
    }

    /// Persist a config update and apply it to the running services
    pub async fn update_config(&self, update: ConfigUpdate) -> AppResult<OrchestratorConfig> {
        let updated = self.config.write().await.update_config(update)?;

        self.limiter.set_limits(limits_from(&updated))?;
        self.coordinator
            .set_project_root(updated.default_project_root.clone())
            .await;
        self.coordinator
            .set_content_placeholder(updated.content_placeholder.clone())
            .await;
        self.coordinator
            .set_classifier(Arc::new(ProposalResultClassifier::with_store(
                ProposalSettings::from(&updated),
                self.proposal_store.clone(),
            )))
            .await;

        info!(
            max_concurrent_agents = updated.max_concurrent_agents,
            "[Config] Applied configuration update"
        );
        Ok(updated)
    }

    /// Provider used by launches that don't bring their own
    pub async fn set_provider_config(&self, provider: Option<ProviderConfig>) {
        self.coordinator.set_provider_config(provider).await;
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}
