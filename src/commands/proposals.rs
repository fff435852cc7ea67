//! Proposal Commands
//!
//! Validating agent results and managing stored proposals.

use std::path::Path;

use crate::models::proposal::{
    ProposalHandleResult, ProposalIndex, ProposalLocation, ProposalRecord, ProposalValidation,
};
use crate::models::response::CommandResponse;
use crate::state::AppState;

pub async fn validate_proposal_result(
    state: &AppState,
    text: String,
) -> CommandResponse<ProposalValidation> {
    let classifier = state.coordinator().classifier().await;
    CommandResponse::ok(classifier.validate_proposal_result(&text))
}

/// Turn a proposal-generator answer into a stored proposal in the current project
pub async fn handle_proposal_result(
    state: &AppState,
    markdown: String,
    agent_id: String,
) -> CommandResponse<ProposalHandleResult> {
    let Some(project_root) = state.coordinator().defaults().await.project_root else {
        return CommandResponse::err("Project root is required to store a proposal");
    };
    let classifier = state.coordinator().classifier().await;
    let result = classifier
        .handle_proposal_generator_result(&markdown, &agent_id, Path::new(&project_root))
        .await;
    CommandResponse::ok(result)
}

pub async fn list_proposals(
    state: &AppState,
    project_root: String,
) -> CommandResponse<ProposalIndex> {
    state
        .proposal_store()
        .list(Path::new(&project_root))
        .await
        .into()
}

pub async fn load_proposal(
    state: &AppState,
    project_root: String,
    location: ProposalLocation,
    id: String,
) -> CommandResponse<ProposalRecord> {
    state
        .proposal_store()
        .load(Path::new(&project_root), location, &id)
        .await
        .into()
}

/// Move a proposal between proposals, changes and archive
pub async fn move_proposal(
    state: &AppState,
    project_root: String,
    id: String,
    from: ProposalLocation,
    to: ProposalLocation,
) -> CommandResponse<ProposalRecord> {
    state
        .proposal_store()
        .move_to(Path::new(&project_root), &id, from, to)
        .await
        .into()
}

pub async fn delete_proposal(
    state: &AppState,
    project_root: String,
    location: ProposalLocation,
    id: String,
) -> CommandResponse<()> {
    state
        .proposal_store()
        .delete(Path::new(&project_root), location, &id)
        .await
        .into()
}
