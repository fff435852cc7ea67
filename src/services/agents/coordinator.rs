//! Agent Launch Coordinator
//!
//! Launch order: prerequisite validation, backend config conversion, limiter
//! admission, id generation, then the agent is spawned. Admission and
//! recording happen under one limiter lock. Every admitted agent releases its
//! slot exactly once, whether it completes, fails, is cancelled or panics.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use agent_orchestrator_core::ProviderConfig;
use agent_orchestrator_tools::{StreamSession, ToolCallExtractor, DEFAULT_CONTENT_PLACEHOLDER};

use crate::models::agent::{AgentEvent, AgentInfo, AgentStatus, LaunchRequest};
use crate::services::agents::prerequisites::{generate_agent_id, validate_launch_prerequisites};
use crate::services::agents::registry::AgentRegistry;
use crate::services::agents::runner::{AgentContext, AgentRunner};
use crate::services::agents::LaunchError;
use crate::services::limiter::{Admission, LimiterStats, SharedLimiter};
use crate::services::proposal::ProposalResultClassifier;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Workspace-level launch settings
#[derive(Debug, Clone)]
pub struct LaunchDefaults {
    pub project_root: Option<String>,
    pub provider_config: Option<ProviderConfig>,
    /// Placeholder sentinel handed to each agent's extractor
    pub content_placeholder: String,
}

impl Default for LaunchDefaults {
    fn default() -> Self {
        Self {
            project_root: None,
            provider_config: None,
            content_placeholder: DEFAULT_CONTENT_PLACEHOLDER.to_string(),
        }
    }
}

/// Releases a limiter slot when dropped
struct SlotGuard {
    limiter: SharedLimiter,
    agent_id: String,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.limiter.release(&self.agent_id);
    }
}

enum RunOutcome {
    Completed(String),
    Failed(String),
    Cancelled,
}

pub struct AgentLaunchCoordinator {
    limiter: SharedLimiter,
    registry: AgentRegistry,
    runner: Arc<dyn AgentRunner>,
    classifier: RwLock<Arc<ProposalResultClassifier>>,
    defaults: RwLock<LaunchDefaults>,
    events: broadcast::Sender<AgentEvent>,
}

impl AgentLaunchCoordinator {
    pub fn new(
        limiter: SharedLimiter,
        runner: Arc<dyn AgentRunner>,
        classifier: Arc<ProposalResultClassifier>,
        defaults: LaunchDefaults,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            limiter,
            registry: AgentRegistry::new(),
            runner,
            classifier: RwLock::new(classifier),
            defaults: RwLock::new(defaults),
            events,
        }
    }

    pub fn limiter(&self) -> &SharedLimiter {
        &self.limiter
    }

    pub async fn classifier(&self) -> Arc<ProposalResultClassifier> {
        Arc::clone(&*self.classifier.read().await)
    }

    /// Replace the proposal classifier used by agents launched from now on
    pub async fn set_classifier(&self, classifier: Arc<ProposalResultClassifier>) {
        *self.classifier.write().await = classifier;
    }

    /// Receive lifecycle events of every agent launched from now on
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.events.subscribe()
    }

    pub async fn set_project_root(&self, project_root: Option<String>) {
        self.defaults.write().await.project_root = project_root.filter(|r| !r.trim().is_empty());
    }

    pub async fn set_provider_config(&self, provider_config: Option<ProviderConfig>) {
        self.defaults.write().await.provider_config = provider_config;
    }

    pub async fn set_content_placeholder(&self, placeholder: String) {
        self.defaults.write().await.content_placeholder = placeholder;
    }

    pub async fn defaults(&self) -> LaunchDefaults {
        self.defaults.read().await.clone()
    }

    /// Validate, admit and start an agent, returning its id
    pub async fn launch(&self, request: LaunchRequest) -> Result<String, LaunchError> {
        let defaults = self.defaults.read().await.clone();
        let provider = request
            .provider_config_override
            .clone()
            .or(defaults.provider_config);

        validate_launch_prerequisites(defaults.project_root.as_deref(), provider.as_ref())?;
        let (Some(project_root), Some(provider)) = (defaults.project_root, provider) else {
            return Err(LaunchError::MissingProviderConfig);
        };
        let backend_config = provider.to_backend();

        let agent_id = match self.limiter.admit(generate_agent_id)? {
            Admission::Admitted(id) => id,
            Admission::Refused { reason, stats } => {
                info!(agent_type = %request.agent_type, "[Launch] Refused: {}", reason);
                return Err(limit_reached(&stats));
            }
        };
        let slot = SlotGuard {
            limiter: self.limiter.clone(),
            agent_id: agent_id.clone(),
        };

        let cancel = CancellationToken::new();
        self.registry
            .register(
                AgentInfo {
                    id: agent_id.clone(),
                    agent_type: request.agent_type.clone(),
                    status: AgentStatus::Running,
                    target_message_id: request.target_message_id.clone(),
                    project_root: project_root.clone(),
                    started_at: Utc::now(),
                    finished_at: None,
                },
                cancel.clone(),
            )
            .await;

        let ctx = AgentContext {
            agent_id: agent_id.clone(),
            agent_type: request.agent_type.clone(),
            project_root,
            initial_prompt: request.initial_prompt,
            target_message_id: request.target_message_id,
            backend_config,
        };

        info!(
            agent_id = %agent_id,
            agent_type = %ctx.agent_type,
            "[Launch] Agent started"
        );
        emit(
            &self.events,
            AgentEvent::Started {
                agent_id: agent_id.clone(),
                agent_type: ctx.agent_type.clone(),
            },
        );

        let extractor = ToolCallExtractor::new(defaults.content_placeholder);
        let classifier = self.classifier().await;
        self.spawn_agent(ctx, extractor, classifier, cancel, slot);
        Ok(agent_id)
    }

    fn spawn_agent(
        &self,
        ctx: AgentContext,
        extractor: ToolCallExtractor,
        classifier: Arc<ProposalResultClassifier>,
        cancel: CancellationToken,
        slot: SlotGuard,
    ) {
        let runner = Arc::clone(&self.runner);
        let registry = self.registry.clone();
        let events = self.events.clone();
        let agent_id = ctx.agent_id.clone();
        let agent_type = ctx.agent_type.clone();
        let project_root = PathBuf::from(&ctx.project_root);

        let run = tokio::spawn(async move {
            // Dropped when this task ends, including by panic.
            let _slot = slot;
            let mut session = StreamSession::new(extractor);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => RunOutcome::Cancelled,
                result = runner.run(ctx, &mut session, cancel.clone()) => match result {
                    Ok(output) => RunOutcome::Completed(output),
                    Err(_) if cancel.is_cancelled() => RunOutcome::Cancelled,
                    Err(e) => RunOutcome::Failed(e.to_string()),
                },
            }
        });

        tokio::spawn(async move {
            let outcome = match run.await {
                Ok(outcome) => outcome,
                Err(e) if e.is_panic() => RunOutcome::Failed("Agent task panicked".to_string()),
                Err(_) => RunOutcome::Cancelled,
            };

            let status = match outcome {
                RunOutcome::Completed(output) => {
                    info!(agent_id = %agent_id, "[Launch] Agent completed");
                    emit(
                        &events,
                        AgentEvent::Completed {
                            agent_id: agent_id.clone(),
                            output: output.clone(),
                        },
                    );
                    if classifier.should_handle_proposal_result(&agent_type, Some(&output)) {
                        let event =
                            handle_proposal(&classifier, &output, &agent_id, &project_root).await;
                        emit(&events, event);
                    }
                    AgentStatus::Completed
                }
                RunOutcome::Failed(error) => {
                    warn!(agent_id = %agent_id, "[Launch] Agent failed: {}", error);
                    emit(
                        &events,
                        AgentEvent::Failed {
                            agent_id: agent_id.clone(),
                            error: error.clone(),
                        },
                    );
                    AgentStatus::Failed(error)
                }
                RunOutcome::Cancelled => {
                    info!(agent_id = %agent_id, "[Launch] Agent cancelled");
                    emit(
                        &events,
                        AgentEvent::Cancelled {
                            agent_id: agent_id.clone(),
                        },
                    );
                    AgentStatus::Cancelled
                }
            };
            registry.finish(&agent_id, status).await;
        });
    }

    /// Request cancellation; finished agents are left alone
    pub async fn cancel_agent(&self, agent_id: &str) -> Result<bool, LaunchError> {
        let cancelled = self
            .registry
            .cancel(agent_id)
            .await
            .ok_or_else(|| LaunchError::AgentNotFound(agent_id.to_string()))?;
        if cancelled {
            info!(agent_id = %agent_id, "[Launch] Cancellation requested");
        }
        Ok(cancelled)
    }

    pub async fn agent_status(&self, agent_id: &str) -> Result<AgentInfo, LaunchError> {
        self.registry
            .get(agent_id)
            .await
            .ok_or_else(|| LaunchError::AgentNotFound(agent_id.to_string()))
    }

    pub async fn list_agents(&self) -> Vec<AgentInfo> {
        self.registry.list().await
    }

    /// Wait until the agent reaches a terminal status
    pub async fn wait_for_agent(&self, agent_id: &str) -> Result<AgentStatus, LaunchError> {
        let mut rx = self
            .registry
            .subscribe(agent_id)
            .await
            .ok_or_else(|| LaunchError::AgentNotFound(agent_id.to_string()))?;
        let status = rx
            .wait_for(|status| status.is_terminal())
            .await
            .map_err(|_| LaunchError::Internal("agent status channel closed".to_string()))?;
        Ok(status.clone())
    }

    /// Forget finished agents
    pub async fn prune_finished(&self) -> usize {
        self.registry.prune_finished().await
    }

    pub fn limiter_stats(&self) -> Result<LimiterStats, LaunchError> {
        Ok(self.limiter.get_stats()?)
    }
}

/// Broadcast a lifecycle event; having no subscribers is fine
fn emit(events: &broadcast::Sender<AgentEvent>, event: AgentEvent) {
    if events.send(event).is_err() {
        debug!("[Launch] No event subscribers");
    }
}

fn limit_reached(stats: &LimiterStats) -> LaunchError {
    LaunchError::LimitReached {
        max: stats.max_concurrent_agents,
        current: stats.current_count,
    }
}

async fn handle_proposal(
    classifier: &ProposalResultClassifier,
    output: &str,
    agent_id: &str,
    project_root: &Path,
) -> AgentEvent {
    let validation = classifier.validate_proposal_result(output);
    if !validation.valid {
        let error = validation.error.unwrap_or_default();
        warn!(agent_id = %agent_id, "[Proposal] Rejected agent result: {}", error);
        return AgentEvent::ProposalRejected {
            agent_id: agent_id.to_string(),
            error,
        };
    }

    let result = classifier
        .handle_proposal_generator_result(output, agent_id, project_root)
        .await;
    match (result.success, result.proposal_id, result.error) {
        (true, Some(proposal_id), _) => AgentEvent::ProposalCreated {
            agent_id: agent_id.to_string(),
            proposal_id,
        },
        (_, _, error) => AgentEvent::ProposalRejected {
            agent_id: agent_id.to_string(),
            error: error.unwrap_or_default(),
        },
    }
}
