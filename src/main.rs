//! agent-orchestrator-replay
//!
//! Replays a captured LLM transcript through the streaming extractor in
//! fixed-size chunks and prints the resulting tool calls as JSON. With
//! `--as-agent` the transcript instead drives a full agent launch, including
//! proposal handling for the proposal-generator role.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use agent_orchestrator::models::agent::{AgentEvent, AgentStatus, LaunchRequest};
use agent_orchestrator::services::agents::TranscriptRunner;
use agent_orchestrator::storage::ConfigService;
use agent_orchestrator::AppState;
use agent_orchestrator_core::ProviderConfig;
use agent_orchestrator_tools::{StreamSession, ToolCallCandidate, ToolCallExtractor};

#[derive(Parser, Debug)]
#[command(name = "agent-orchestrator-replay")]
#[command(about = "Replay a captured LLM transcript through the tool call extractor")]
#[command(version)]
struct Args {
    /// Transcript file to replay
    #[arg(value_name = "FILE")]
    transcript: PathBuf,

    /// Chunk size in bytes
    #[arg(long, default_value_t = 64)]
    chunk: usize,

    /// Placeholder sentinel (defaults to the configured one)
    #[arg(long)]
    placeholder: Option<String>,

    /// Config file (defaults to ~/.agent-orchestrator/config.json when launching)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Launch the transcript as an agent of this type
    #[arg(long, value_name = "TYPE", requires = "project")]
    as_agent: Option<String>,

    /// Project root for agent launches
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamReport {
    chunks: usize,
    tool_calls: Vec<ToolCallCandidate>,
    prose: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentReport {
    agent_id: String,
    status: AgentStatus,
    events: Vec<AgentEvent>,
}

fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agent_orchestrator=info,warn"));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn load_config(args: &Args) -> Result<Option<ConfigService>> {
    args.config
        .as_ref()
        .map(|path| {
            ConfigService::open(path).with_context(|| format!("loading {}", path.display()))
        })
        .transpose()
}

fn replay_stream(args: &Args, transcript: String) -> Result<StreamReport> {
    let config = load_config(args)?
        .map(|service| service.get_config().clone())
        .unwrap_or_default();
    let placeholder = args
        .placeholder
        .clone()
        .unwrap_or(config.content_placeholder);

    let runner = TranscriptRunner::new(transcript).with_chunk_size(args.chunk);
    let mut session = StreamSession::new(ToolCallExtractor::new(placeholder));
    let chunks = runner.chunks();
    for chunk in &chunks {
        for candidate in session.push_chunk(chunk) {
            info!(
                id = %candidate.id,
                tool = %candidate.tool,
                "[Replay] Tool call completed mid-stream"
            );
        }
    }
    for candidate in session.finish() {
        info!(
            id = %candidate.id,
            tool = %candidate.tool,
            "[Replay] Tool call completed at end of stream"
        );
    }

    Ok(StreamReport {
        chunks: chunks.len(),
        tool_calls: session.candidates().to_vec(),
        prose: session.prose(),
    })
}

async fn replay_as_agent(args: &Args, agent_type: &str, transcript: String) -> Result<AgentReport> {
    let project = args
        .project
        .as_ref()
        .context("--project is required with --as-agent")?;
    let config = match load_config(args)? {
        Some(service) => service,
        None => ConfigService::new().context("loading default config")?,
    };

    let runner = TranscriptRunner::new(transcript).with_chunk_size(args.chunk);
    let state = AppState::new(config, Arc::new(runner));
    let coordinator = state.coordinator();
    coordinator
        .set_project_root(Some(project.to_string_lossy().into_owned()))
        .await;
    if let Some(placeholder) = &args.placeholder {
        coordinator.set_content_placeholder(placeholder.clone()).await;
    }
    state
        .set_provider_config(Some(ProviderConfig::new("replay", "replay", "replay")))
        .await;

    let mut events = coordinator.subscribe();
    let agent_id = coordinator
        .launch(LaunchRequest::new(agent_type, "replay transcript"))
        .await?;
    let status = coordinator.wait_for_agent(&agent_id).await?;

    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }

    Ok(AgentReport {
        agent_id,
        status,
        events: collected,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let transcript = std::fs::read_to_string(&args.transcript)
        .with_context(|| format!("reading {}", args.transcript.display()))?;

    let output = match args.as_agent.clone() {
        Some(agent_type) => {
            serde_json::to_string_pretty(&replay_as_agent(&args, &agent_type, transcript).await?)?
        }
        None => serde_json::to_string_pretty(&replay_stream(&args, transcript)?)?,
    };
    println!("{output}");
    Ok(())
}
