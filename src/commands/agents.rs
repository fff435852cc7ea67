//! Agent Commands
//!
//! Launching, cancelling and inspecting background agents.

use crate::models::agent::{AgentInfo, AgentStatus, LaunchRequest};
use crate::models::response::CommandResponse;
use crate::models::settings::ConfigUpdate;
use crate::services::limiter::{LaunchValidation, LimiterStats, ResourceLimits};
use crate::state::AppState;

/// Launch an agent, returning its id
pub async fn launch_agent(state: &AppState, request: LaunchRequest) -> CommandResponse<String> {
    match state.coordinator().launch(request).await {
        Ok(agent_id) => CommandResponse::ok(agent_id),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

/// Cancel a running agent; `false` if it had already finished
pub async fn cancel_agent(state: &AppState, agent_id: String) -> CommandResponse<bool> {
    match state.coordinator().cancel_agent(&agent_id).await {
        Ok(cancelled) => CommandResponse::ok(cancelled),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

pub async fn get_agent_status(
    state: &AppState,
    agent_id: String,
) -> CommandResponse<AgentInfo> {
    match state.coordinator().agent_status(&agent_id).await {
        Ok(info) => CommandResponse::ok(info),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

pub async fn list_agents(state: &AppState) -> CommandResponse<Vec<AgentInfo>> {
    CommandResponse::ok(state.coordinator().list_agents().await)
}

/// Block until the agent finishes
pub async fn wait_for_agent(state: &AppState, agent_id: String) -> CommandResponse<AgentStatus> {
    match state.coordinator().wait_for_agent(&agent_id).await {
        Ok(status) => CommandResponse::ok(status),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}

pub async fn get_limiter_stats(state: &AppState) -> CommandResponse<LimiterStats> {
    state.limiter().get_stats().into()
}

/// Whether one more agent could start right now
pub async fn validate_agent_launch(
    state: &AppState,
    agent_id: String,
) -> CommandResponse<LaunchValidation> {
    state
        .limiter()
        .lock()
        .map(|limiter| limiter.validate_launch(&agent_id))
        .into()
}

/// Change the concurrency limit and persist it
pub async fn set_resource_limits(
    state: &AppState,
    limits: ResourceLimits,
) -> CommandResponse<ResourceLimits> {
    let update = ConfigUpdate {
        max_concurrent_agents: Some(limits.max_concurrent_agents),
        ..Default::default()
    };
    match state.update_config(update).await {
        Ok(_) => CommandResponse::ok(limits),
        Err(e) => CommandResponse::err(e.to_string()),
    }
}
