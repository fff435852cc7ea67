//! Proposal And Settings Command Integration Tests

use std::sync::Arc;

use serde_json::{json, Map, Value};

use agent_orchestrator::commands::{
    convert_provider_config, delete_proposal, extract_tool_calls, handle_proposal_result,
    list_proposals, load_proposal, move_proposal, strip_tool_call_blocks, update_settings,
    validate_proposal_result,
};
use agent_orchestrator::models::proposal::{ProposalLocation, ProposalStatus};
use agent_orchestrator::services::agents::TranscriptRunner;
use agent_orchestrator::storage::ConfigService;
use agent_orchestrator::{AppState, ConfigUpdate};

const PROPOSAL: &str = "# Proposal: Split the config loader

## Why

The loader mixes file IO with validation, so neither can be tested alone.

## What Changes

- Move validation into its own function
- Keep file IO in the service

## Impact

- **Specs affected**: config
- **Files affected**: src/storage/config.rs

## Tasks

- [ ] Extract the validation function
- [x] Add unit tests for validation
";

fn new_state(dir: &tempfile::TempDir) -> AppState {
    let config = ConfigService::open(dir.path().join("config.json")).unwrap();
    AppState::new(config, Arc::new(TranscriptRunner::new("")))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_short_result_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let state = new_state(&dir);

    let validation = validate_proposal_result(&state, "short".to_string())
        .await
        .data
        .unwrap();
    assert!(!validation.valid);
    assert_eq!(
        validation.error.as_deref(),
        Some("Result is too short to be a valid proposal")
    );

    let validation = validate_proposal_result(&state, PROPOSAL.to_string())
        .await
        .data
        .unwrap();
    assert!(validation.valid);
}

#[tokio::test]
async fn test_min_length_follows_settings() {
    let dir = tempfile::tempdir().unwrap();
    let state = new_state(&dir);

    let updated = update_settings(
        &state,
        ConfigUpdate {
            proposal_min_length: Some(5),
            ..Default::default()
        },
    )
    .await;
    assert!(updated.success);

    let validation = validate_proposal_result(&state, "## Why\nok".to_string())
        .await
        .data
        .unwrap();
    assert!(validation.valid);
}

// ============================================================================
// Stored proposals
// ============================================================================

#[tokio::test]
async fn test_handle_requires_project_root() {
    let dir = tempfile::tempdir().unwrap();
    let state = new_state(&dir);

    let response = handle_proposal_result(&state, PROPOSAL.to_string(), "agent-1".to_string()).await;
    assert!(!response.success);
}

#[tokio::test]
async fn test_proposal_lifecycle_through_commands() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("project");
    let project_root = project.to_string_lossy().into_owned();
    let state = new_state(&dir);
    update_settings(
        &state,
        ConfigUpdate {
            default_project_root: Some(project_root.clone()),
            ..Default::default()
        },
    )
    .await;

    let handled = handle_proposal_result(&state, PROPOSAL.to_string(), "agent-1".to_string())
        .await
        .data
        .unwrap();
    assert!(handled.success);
    let id = handled.proposal_id.unwrap();

    let record = load_proposal(
        &state,
        project_root.clone(),
        ProposalLocation::Proposals,
        id.clone(),
    )
    .await
    .data
    .unwrap();
    assert_eq!(record.document.title, "Split the config loader");
    assert_eq!(record.status, ProposalStatus::Draft);
    assert_eq!(record.source_agent_id.as_deref(), Some("agent-1"));
    assert_eq!(record.document.what_changes.len(), 2);
    assert_eq!(record.document.tasks.len(), 2);
    assert!(record.document.tasks[1].done);
    assert!(project.join(".agent-orchestrator").exists());

    let moved = move_proposal(
        &state,
        project_root.clone(),
        id.clone(),
        ProposalLocation::Proposals,
        ProposalLocation::Changes,
    )
    .await
    .data
    .unwrap();
    assert_eq!(moved.location, ProposalLocation::Changes);

    let index = list_proposals(&state, project_root.clone()).await.data.unwrap();
    assert_eq!(index.proposals.len(), 1);
    assert_eq!(index.proposals[0].location, ProposalLocation::Changes);

    let stale = load_proposal(
        &state,
        project_root.clone(),
        ProposalLocation::Proposals,
        id.clone(),
    )
    .await;
    assert!(!stale.success);

    let deleted = delete_proposal(&state, project_root.clone(), ProposalLocation::Changes, id).await;
    assert!(deleted.success);
    let index = list_proposals(&state, project_root).await.data.unwrap();
    assert!(index.proposals.is_empty());
}

// ============================================================================
// Provider conversion
// ============================================================================

#[test]
fn test_provider_aliases_added() {
    let input = object(json!({"protocol": "openai", "apiKey": "k", "baseUrl": "u"}));
    let output = convert_provider_config(input).data.unwrap();

    assert_eq!(output["provider"], json!("openai"));
    assert_eq!(output["api_key"], json!("k"));
    assert_eq!(output["base_url"], json!("u"));
    assert_eq!(output["protocol"], json!("openai"));
    assert_eq!(output["apiKey"], json!("k"));
    assert_eq!(output["baseUrl"], json!("u"));
}

// ============================================================================
// Extraction commands
// ============================================================================

#[tokio::test]
async fn test_extraction_uses_configured_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let state = new_state(&dir);
    update_settings(
        &state,
        ConfigUpdate {
            content_placeholder: Some("@@BODY@@".to_string()),
            ..Default::default()
        },
    )
    .await;

    let text = "```toml\n[package]\nname = \"demo\"\n```\nWriting it.\n```json\n{\"tool\":\"agent_write_file\",\"args\":{\"rel_path\":\"Cargo.toml\",\"content\":\"@@BODY@@\"}}\n```";
    let result = extract_tool_calls(&state, text.to_string(), true)
        .await
        .data
        .unwrap();
    assert_eq!(result.tool_calls.len(), 1);
    assert_eq!(
        result.tool_calls[0].argument_str("content"),
        Some("[package]\nname = \"demo\"")
    );

    let prose = strip_tool_call_blocks(&state, text.to_string()).await.data.unwrap();
    assert_eq!(prose, "```toml\n[package]\nname = \"demo\"\n```\nWriting it.");
}
