//! Launch Integration Tests
//!
//! Drives `AppState` end to end: prerequisite checks, limiter admission,
//! cancellation and proposal handling for the proposal-generator role.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use agent_orchestrator::commands::agents::{get_limiter_stats, launch_agent};
use agent_orchestrator::models::agent::{AgentEvent, AgentStatus, LaunchRequest};
use agent_orchestrator::models::settings::ConfigUpdate;
use agent_orchestrator::services::agents::{AgentContext, AgentRunner, TranscriptRunner};
use agent_orchestrator::services::agents::LaunchError;
use agent_orchestrator::storage::ConfigService;
use agent_orchestrator::{AppResult, AppState};
use agent_orchestrator_core::ProviderConfig;
use agent_orchestrator_tools::StreamSession;

const PROPOSAL: &str = "# Proposal: Add request tracing

## Why

Slow requests can't be attributed to a handler without per-request spans.

## What Changes

- Wrap every handler in a tracing span
- Log latency when a span closes

## Impact

- **Files affected**: src/server.rs
";

/// Echoes the prompt, or waits for cancellation when asked to hold
struct HoldingRunner;

#[async_trait]
impl AgentRunner for HoldingRunner {
    async fn run(
        &self,
        ctx: AgentContext,
        session: &mut StreamSession,
        cancel: CancellationToken,
    ) -> AppResult<String> {
        if ctx.initial_prompt == "hold" {
            cancel.cancelled().await;
        }
        session.push_chunk(&ctx.initial_prompt);
        session.finish();
        Ok(session.text().to_string())
    }
}

async fn state_with(
    dir: &TempDir,
    runner: Arc<dyn AgentRunner>,
    max_concurrent_agents: u32,
) -> AppState {
    let config = ConfigService::open(dir.path().join("config.json")).unwrap();
    let state = AppState::new(config, runner);
    state
        .update_config(ConfigUpdate {
            max_concurrent_agents: Some(max_concurrent_agents),
            default_project_root: Some(dir.path().join("project").to_string_lossy().into_owned()),
            ..Default::default()
        })
        .await
        .unwrap();
    state
        .set_provider_config(Some(ProviderConfig::new("openai", "openai", "sk-test")))
        .await;
    state
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<AgentEvent>) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Prerequisites
// ============================================================================

#[tokio::test]
async fn test_launch_without_provider_takes_no_slot() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigService::open(dir.path().join("config.json")).unwrap();
    let state = AppState::new(config, Arc::new(HoldingRunner));
    state
        .coordinator()
        .set_project_root(Some("/work/app".to_string()))
        .await;

    let result = state
        .coordinator()
        .launch(LaunchRequest::new("explore", "look around"))
        .await;
    assert_eq!(result, Err(LaunchError::MissingProviderConfig));
    assert_eq!(state.limiter().get_current_count().unwrap(), 0);
}

#[tokio::test]
async fn test_launch_command_reports_missing_project_root() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigService::open(dir.path().join("config.json")).unwrap();
    let state = AppState::new(config, Arc::new(HoldingRunner));

    let response = launch_agent(&state, LaunchRequest::new("explore", "look around")).await;
    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Project root is required to launch an agent")
    );
}

// ============================================================================
// Admission and release
// ============================================================================

#[tokio::test]
async fn test_limit_refuses_then_frees_on_cancel() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, Arc::new(HoldingRunner), 2).await;
    let coordinator = state.coordinator();

    let first = coordinator
        .launch(LaunchRequest::new("explore", "hold"))
        .await
        .unwrap();
    let second = coordinator
        .launch(LaunchRequest::new("explore", "hold"))
        .await
        .unwrap();
    assert_ne!(first, second);

    let refused = coordinator
        .launch(LaunchRequest::new("explore", "hold"))
        .await;
    assert_eq!(refused, Err(LaunchError::LimitReached { max: 2, current: 2 }));

    assert_eq!(coordinator.cancel_agent(&first).await, Ok(true));
    assert_eq!(
        coordinator.wait_for_agent(&first).await,
        Ok(AgentStatus::Cancelled)
    );
    assert_eq!(state.limiter().get_current_count().unwrap(), 1);

    let third = coordinator
        .launch(LaunchRequest::new("explore", "done quickly"))
        .await
        .unwrap();
    assert_eq!(
        coordinator.wait_for_agent(&third).await,
        Ok(AgentStatus::Completed)
    );

    assert_eq!(coordinator.cancel_agent(&second).await, Ok(true));
    coordinator.wait_for_agent(&second).await.unwrap();

    let stats = get_limiter_stats(&state).await.data.unwrap();
    assert_eq!(stats.current_count, 0);
    assert_eq!(stats.available_slots, 2);
}

#[tokio::test]
async fn test_cancel_finished_agent_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, Arc::new(HoldingRunner), 1).await;
    let coordinator = state.coordinator();

    let id = coordinator
        .launch(LaunchRequest::new("explore", "quick"))
        .await
        .unwrap();
    coordinator.wait_for_agent(&id).await.unwrap();

    assert_eq!(coordinator.cancel_agent(&id).await, Ok(false));
    assert_eq!(
        coordinator.cancel_agent("missing").await,
        Err(LaunchError::AgentNotFound("missing".to_string()))
    );
}

// ============================================================================
// Proposal handling
// ============================================================================

#[tokio::test]
async fn test_proposal_generator_result_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let runner = TranscriptRunner::new(PROPOSAL).with_chunk_size(16);
    let state = state_with(&dir, Arc::new(runner), 2).await;
    let coordinator = state.coordinator();
    let mut events = coordinator.subscribe();

    let id = coordinator
        .launch(LaunchRequest::new("proposal-generator", "draft a proposal"))
        .await
        .unwrap();
    assert_eq!(
        coordinator.wait_for_agent(&id).await,
        Ok(AgentStatus::Completed)
    );

    let events = drain(&mut events);
    let proposal_id = events
        .iter()
        .find_map(|event| match event {
            AgentEvent::ProposalCreated { proposal_id, .. } => Some(proposal_id.clone()),
            _ => None,
        })
        .expect("proposal created event");
    assert!(events.iter().all(|event| event.agent_id() == id));

    let index = state
        .proposal_store()
        .list(&dir.path().join("project"))
        .await
        .unwrap();
    assert_eq!(index.proposals.len(), 1);
    assert_eq!(index.proposals[0].id, proposal_id);
    assert_eq!(index.proposals[0].title, "Add request tracing");
}

#[tokio::test]
async fn test_other_agent_types_skip_proposal_handling() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, Arc::new(TranscriptRunner::new(PROPOSAL)), 2).await;
    let coordinator = state.coordinator();
    let mut events = coordinator.subscribe();

    let id = coordinator
        .launch(LaunchRequest::new("explore", "read the code"))
        .await
        .unwrap();
    coordinator.wait_for_agent(&id).await.unwrap();

    let events = drain(&mut events);
    assert!(events.iter().any(|e| matches!(e, AgentEvent::Completed { .. })));
    assert!(!events.iter().any(|e| matches!(
        e,
        AgentEvent::ProposalCreated { .. } | AgentEvent::ProposalRejected { .. }
    )));
    let project = dir.path().join("project");
    let index = state.proposal_store().list(Path::new(&project)).await.unwrap();
    assert!(index.proposals.is_empty());
}

#[tokio::test]
async fn test_short_proposal_is_rejected_with_reason() {
    let dir = tempfile::tempdir().unwrap();
    let state = state_with(&dir, Arc::new(TranscriptRunner::new("## Why\nbecause")), 2).await;
    let coordinator = state.coordinator();
    let mut events = coordinator.subscribe();

    let id = coordinator
        .launch(LaunchRequest::new("proposal-generator", "draft"))
        .await
        .unwrap();
    assert_eq!(
        coordinator.wait_for_agent(&id).await,
        Ok(AgentStatus::Completed)
    );

    let rejected = drain(&mut events).into_iter().find_map(|event| match event {
        AgentEvent::ProposalRejected { error, .. } => Some(error),
        _ => None,
    });
    assert_eq!(
        rejected.as_deref(),
        Some("Result is too short to be a valid proposal")
    );
}
