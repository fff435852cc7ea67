//! Agent Runner
//!
//! The seam between the launch coordinator and whatever actually drives an
//! agent (LLM streaming plus tool execution). The coordinator owns admission,
//! cancellation and bookkeeping; a runner only has to stream text into the
//! session it is given and return the agent's final answer.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use agent_orchestrator_core::BackendConfig;
use agent_orchestrator_tools::StreamSession;

use crate::utils::error::{AppError, AppResult};

/// Everything a runner needs to know about the agent it drives
#[derive(Debug, Clone)]
pub struct AgentContext {
    pub agent_id: String,
    pub agent_type: String,
    pub project_root: String,
    pub initial_prompt: String,
    pub target_message_id: Option<String>,
    /// Provider config with the legacy snake_case aliases filled in
    pub backend_config: BackendConfig,
}

/// Drives one agent to completion
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Run the agent, feeding streamed text into `session`.
    ///
    /// Returns the final answer. Runners should return promptly once
    /// `cancel` fires; the coordinator stops waiting on them either way.
    async fn run(
        &self,
        ctx: AgentContext,
        session: &mut StreamSession,
        cancel: CancellationToken,
    ) -> AppResult<String>;
}

/// Runner that replays a captured transcript in fixed-size chunks.
///
/// Used by the replay binary and tests in place of a live provider.
#[derive(Debug, Clone)]
pub struct TranscriptRunner {
    transcript: String,
    chunk_size: usize,
}

impl TranscriptRunner {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            chunk_size: 64,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Split the transcript into chunks of at most `chunk_size` bytes,
    /// never cutting a UTF-8 character.
    pub fn chunks(&self) -> Vec<&str> {
        let text = self.transcript.as_str();
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < text.len() {
            let mut end = (start + self.chunk_size).min(text.len());
            while !text.is_char_boundary(end) {
                end += 1;
            }
            chunks.push(&text[start..end]);
            start = end;
        }
        chunks
    }
}

#[async_trait]
impl AgentRunner for TranscriptRunner {
    async fn run(
        &self,
        ctx: AgentContext,
        session: &mut StreamSession,
        cancel: CancellationToken,
    ) -> AppResult<String> {
        for chunk in self.chunks() {
            if cancel.is_cancelled() {
                return Err(AppError::internal(format!(
                    "Agent {} cancelled mid-stream",
                    ctx.agent_id
                )));
            }
            for candidate in session.push_chunk(chunk) {
                debug!(
                    agent_id = %ctx.agent_id,
                    tool = %candidate.tool,
                    id = %candidate.id,
                    "[Runner] Tool call completed"
                );
            }
            tokio::task::yield_now().await;
        }
        session.finish();
        Ok(session.text().to_string())
    }
}
