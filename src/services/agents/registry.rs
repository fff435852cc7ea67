//! Agent Registry
//!
//! Tracks every launched agent: its status, cancellation token and a watch
//! channel that completes when the agent reaches a terminal status.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;

use crate::models::agent::{AgentInfo, AgentStatus};

struct AgentEntry {
    info: AgentInfo,
    cancel: CancellationToken,
    status_tx: watch::Sender<AgentStatus>,
}

/// Shared table of launched agents
#[derive(Clone, Default)]
pub struct AgentRegistry {
    agents: Arc<RwLock<HashMap<String, AgentEntry>>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly launched agent
    pub async fn register(&self, info: AgentInfo, cancel: CancellationToken) {
        let (status_tx, _) = watch::channel(info.status.clone());
        let mut agents = self.agents.write().await;
        agents.insert(
            info.id.clone(),
            AgentEntry {
                info,
                cancel,
                status_tx,
            },
        );
    }

    pub async fn get(&self, agent_id: &str) -> Option<AgentInfo> {
        let agents = self.agents.read().await;
        agents.get(agent_id).map(|entry| entry.info.clone())
    }

    /// All agents, oldest first
    pub async fn list(&self) -> Vec<AgentInfo> {
        let agents = self.agents.read().await;
        let mut infos: Vec<AgentInfo> = agents.values().map(|e| e.info.clone()).collect();
        infos.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        infos
    }

    pub async fn running_count(&self) -> usize {
        let agents = self.agents.read().await;
        agents
            .values()
            .filter(|e| e.info.status == AgentStatus::Running)
            .count()
    }

    /// Fire the agent's cancellation token.
    ///
    /// Returns `None` for unknown ids and `Some(false)` when the agent had
    /// already finished.
    pub async fn cancel(&self, agent_id: &str) -> Option<bool> {
        let agents = self.agents.read().await;
        let entry = agents.get(agent_id)?;
        if entry.info.status.is_terminal() {
            return Some(false);
        }
        entry.cancel.cancel();
        Some(true)
    }

    /// Record the terminal status and wake anyone waiting on the agent
    pub async fn finish(&self, agent_id: &str, status: AgentStatus) {
        let mut agents = self.agents.write().await;
        if let Some(entry) = agents.get_mut(agent_id) {
            entry.info.status = status.clone();
            entry.info.finished_at = Some(Utc::now());
            entry.status_tx.send_replace(status);
        }
    }

    pub async fn subscribe(&self, agent_id: &str) -> Option<watch::Receiver<AgentStatus>> {
        let agents = self.agents.read().await;
        agents.get(agent_id).map(|e| e.status_tx.subscribe())
    }

    /// Drop finished agents from the table, returning how many were removed
    pub async fn prune_finished(&self) -> usize {
        let mut agents = self.agents.write().await;
        let before = agents.len();
        agents.retain(|_, e| !e.info.status.is_terminal());
        before - agents.len()
    }
}
