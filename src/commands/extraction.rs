//! Extraction Commands
//!
//! Tool call extraction over a response text, using the configured
//! placeholder sentinel.

use agent_orchestrator_tools::{strip_tool_calls, ExtractionResult, ToolCallExtractor};

use crate::models::response::CommandResponse;
use crate::state::AppState;

async fn extractor(state: &AppState) -> ToolCallExtractor {
    ToolCallExtractor::new(state.get_config().await.content_placeholder)
}

/// Extract tool calls; `finished` treats the text as a complete response
pub async fn extract_tool_calls(
    state: &AppState,
    text: String,
    finished: bool,
) -> CommandResponse<ExtractionResult> {
    let extractor = extractor(state).await;
    let result = if finished {
        extractor.extract_final(&text)
    } else {
        extractor.extract(&text)
    };
    CommandResponse::ok(result)
}

/// The response text with its tool call blocks removed
pub async fn strip_tool_call_blocks(state: &AppState, text: String) -> CommandResponse<String> {
    let candidates = extractor(state).await.extract_final(&text).tool_calls;
    CommandResponse::ok(strip_tool_calls(&text, &candidates))
}
