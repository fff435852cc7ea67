//! Agent Resource Limiter
//!
//! Admission control for concurrently running agents. The limiter is a plain
//! state object; the launch coordinator shares one instance behind a mutex so
//! the check-then-record step is serialized across launches.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::settings::DEFAULT_MAX_CONCURRENT_AGENTS;
use crate::utils::error::{AppError, AppResult};

/// Concurrency limits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLimits {
    /// Maximum number of agents running at once (0 means none may run)
    pub max_concurrent_agents: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_concurrent_agents: DEFAULT_MAX_CONCURRENT_AGENTS,
        }
    }
}

/// Read-only view of limiter usage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LimiterStats {
    pub current_count: u32,
    pub max_concurrent_agents: u32,
    pub available_slots: u32,
    /// current / max, 0 when the limit is 0
    pub utilization: f64,
}

/// Result of a single-agent admission check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchValidation {
    pub can_launch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Tracks running agents against the configured limit
#[derive(Debug, Default)]
pub struct AgentResourceLimiter {
    limits: ResourceLimits,
    active_agents: HashSet<String>,
}

impl AgentResourceLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self {
            limits,
            active_agents: HashSet::new(),
        }
    }

    /// Replace the active limits; running agents are not affected
    pub fn set_limits(&mut self, limits: ResourceLimits) {
        debug!(
            "[Limiter] max_concurrent_agents {} -> {}",
            self.limits.max_concurrent_agents, limits.max_concurrent_agents
        );
        self.limits = limits;
    }

    pub fn get_limits(&self) -> ResourceLimits {
        self.limits
    }

    /// Whether `additional` more agents fit under the limit
    pub fn can_launch_agent(&self, additional: u32) -> bool {
        if additional == 0 {
            return true;
        }
        let requested = u64::from(self.get_current_count()) + u64::from(additional);
        requested <= u64::from(self.limits.max_concurrent_agents)
    }

    /// Mark an agent as running. Recording the same id twice counts once.
    pub fn record_launch(&mut self, agent_id: &str) {
        if self.active_agents.insert(agent_id.to_string()) {
            debug!(
                agent_id = %agent_id,
                current = self.active_agents.len(),
                "[Limiter] Agent slot taken"
            );
        }
    }

    /// Release an agent's slot. Unknown ids are ignored.
    pub fn record_completion(&mut self, agent_id: &str) {
        if self.active_agents.remove(agent_id) {
            debug!(
                agent_id = %agent_id,
                current = self.active_agents.len(),
                "[Limiter] Agent slot released"
            );
        }
    }

    pub fn is_active(&self, agent_id: &str) -> bool {
        self.active_agents.contains(agent_id)
    }

    pub fn get_current_count(&self) -> u32 {
        u32::try_from(self.active_agents.len()).unwrap_or(u32::MAX)
    }

    pub fn get_stats(&self) -> LimiterStats {
        let current_count = self.get_current_count();
        let max = self.limits.max_concurrent_agents;
        let utilization = if max == 0 {
            0.0
        } else {
            f64::from(current_count) / f64::from(max)
        };
        LimiterStats {
            current_count,
            max_concurrent_agents: max,
            available_slots: max.saturating_sub(current_count),
            utilization,
        }
    }

    /// Check whether one more agent may start, with a reason on refusal
    pub fn validate_launch(&self, agent_id: &str) -> LaunchValidation {
        if self.can_launch_agent(1) {
            return LaunchValidation {
                can_launch: true,
                reason: None,
            };
        }
        let stats = self.get_stats();
        debug!(
            agent_id = %agent_id,
            "[Limiter] Launch refused at {}/{}",
            stats.current_count, stats.max_concurrent_agents
        );
        LaunchValidation {
            can_launch: false,
            reason: Some(format!(
                "Maximum concurrent agents reached ({} of {} running)",
                stats.current_count, stats.max_concurrent_agents
            )),
        }
    }
}

// ============================================================================
// Shared handle
// ============================================================================

/// Outcome of [`SharedLimiter::admit`]
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// Slot recorded under the generated id
    Admitted(String),
    Refused { reason: String, stats: LimiterStats },
}

/// Cloneable handle to one limiter shared by every launch path
#[derive(Debug, Clone, Default)]
pub struct SharedLimiter {
    inner: Arc<Mutex<AgentResourceLimiter>>,
}

impl SharedLimiter {
    pub fn new(limits: ResourceLimits) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AgentResourceLimiter::with_limits(limits))),
        }
    }

    /// Lock the limiter for a compound operation
    pub fn lock(&self) -> AppResult<MutexGuard<'_, AgentResourceLimiter>> {
        self.inner
            .lock()
            .map_err(|_| AppError::internal("lock poisoned"))
    }

    /// Admit one agent and record it in a single locked step.
    ///
    /// The id is generated only after admission succeeds; nothing is recorded
    /// on refusal.
    pub fn admit<F>(&self, generate_id: F) -> AppResult<Admission>
    where
        F: FnOnce() -> String,
    {
        let mut limiter = self.lock()?;
        let validation = limiter.validate_launch("<pending>");
        if !validation.can_launch {
            return Ok(Admission::Refused {
                reason: validation.reason.unwrap_or_default(),
                stats: limiter.get_stats(),
            });
        }
        let agent_id = generate_id();
        limiter.record_launch(&agent_id);
        Ok(Admission::Admitted(agent_id))
    }

    /// Release a slot, recovering the state even if another holder panicked
    pub fn release(&self, agent_id: &str) {
        let mut limiter = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        limiter.record_completion(agent_id);
    }

    pub fn set_limits(&self, limits: ResourceLimits) -> AppResult<()> {
        self.lock()?.set_limits(limits);
        Ok(())
    }

    pub fn get_stats(&self) -> AppResult<LimiterStats> {
        Ok(self.lock()?.get_stats())
    }

    pub fn get_current_count(&self) -> AppResult<u32> {
        Ok(self.lock()?.get_current_count())
    }
}
