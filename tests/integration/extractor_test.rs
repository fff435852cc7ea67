//! Extractor Integration Tests
//!
//! Streaming extraction through the public tools API: placeholder
//! substitution, prose, trailing partials and growing-prefix stability.

use agent_orchestrator_tools::{
    extract_tool_calls, CandidateStatus, StreamSession, ToolCallCandidate, ToolCallExtractor,
    STREAMING_TOOL_ID,
};

const APP_JS: &str = "import React from 'react';\n\nfunction App() {\n  return <h1>Hello</h1>;\n}\n\nexport default App;";

fn write_file_transcript() -> String {
    format!(
        "Here is the component:\n```javascript\n{}\n```\nSaving it now.\n```json\n{{\"tool\":\"agent_write_file\",\"args\":{{\"rel_path\":\"src/App.js\",\"content\":\"<<PLACEHOLDER>>\"}}}}\n```\n",
        APP_JS
    )
}

fn complete_calls(text: &str) -> Vec<ToolCallCandidate> {
    extract_tool_calls(text).complete().cloned().collect()
}

// ============================================================================
// Example scenarios
// ============================================================================

#[test]
fn test_placeholder_replaced_by_preceding_code_block() {
    let text = write_file_transcript();
    let result = extract_tool_calls(&text);

    assert_eq!(result.tool_calls.len(), 1);
    let call = &result.tool_calls[0];
    assert_eq!(call.tool, "agent_write_file");
    assert_eq!(call.status, CandidateStatus::Pending);
    let content = call.argument_str("content").unwrap();
    assert!(content.contains("export default App"));
    assert!(!content.contains("<<PLACEHOLDER>>"));
    assert_eq!(call.argument_str("rel_path"), Some("src/App.js"));
}

#[test]
fn test_plain_prose_has_no_candidates() {
    let result = extract_tool_calls("I looked at the project and everything seems fine.");
    assert!(result.tool_calls.is_empty());
}

#[test]
fn test_unterminated_fence_yields_single_partial() {
    let text = "Writing the file.\n```json\n{\"tool\":\"agent_write_file\",\"args\":{";
    let result = extract_tool_calls(text);

    assert_eq!(result.tool_calls.len(), 1);
    let partial = &result.tool_calls[0];
    assert_eq!(partial.id, STREAMING_TOOL_ID);
    assert_eq!(partial.status, CandidateStatus::Partial);
    assert!(partial.arguments.is_empty());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_spans_never_overlap() {
    let text = format!(
        "{}\nAlso {{\"tool\":\"agent_read_file\",\"arguments\":{{\"rel_path\":\"a.txt\"}}}} too.\n```json\n{{\"tool\":\"agent_list_dir\",\"arguments\":{{\"rel_path\":\".\",}},}}\n```",
        write_file_transcript()
    );
    let result = extract_tool_calls(&text);
    assert_eq!(result.tool_calls.len(), 3);

    for (i, a) in result.tool_calls.iter().enumerate() {
        assert_eq!(&text[a.source_span.range()], a.raw_text);
        for b in result.tool_calls.iter().skip(i + 1) {
            assert!(!a.source_span.overlaps(&b.source_span));
        }
    }
}

#[test]
fn test_complete_candidates_stable_across_prefixes() {
    let text = write_file_transcript();
    let full = complete_calls(&text);

    let mut seen = Vec::new();
    for end in (0..=text.len()).filter(|i| text.is_char_boundary(*i)) {
        let prefix_calls = complete_calls(&text[..end]);
        for call in &seen {
            assert!(prefix_calls.contains(call), "lost candidate at prefix {end}");
        }
        for call in prefix_calls {
            if !seen.contains(&call) {
                seen.push(call);
            }
        }
    }
    assert_eq!(seen, full);
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_session_replaces_partial_with_complete_candidate() {
    let text = write_file_transcript();
    let mut session = StreamSession::new(ToolCallExtractor::default());
    let cut = text.find("\"args\"").unwrap();

    assert!(session.push_chunk(&text[..cut]).is_empty());
    assert!(session.streaming_candidate().is_some());

    let completed = session.push_chunk(&text[cut..]);
    assert_eq!(completed.len(), 1);
    assert!(session.streaming_candidate().is_none());
    assert_eq!(session.candidates().len(), 1);

    assert!(session.finish().is_empty());
    assert_eq!(
        session.prose(),
        format!("Here is the component:\n```javascript\n{}\n```\nSaving it now.", APP_JS)
    );
}

#[test]
fn test_session_dedup_table_is_per_session() {
    let mut first = StreamSession::new(ToolCallExtractor::default());
    let second = StreamSession::new(ToolCallExtractor::default());

    first.deduplicator_mut().add_duplicate("retry-1", "call-1");
    first.deduplicator_mut().add_duplicate("retry-1", "call-2");
    assert_eq!(first.resolve_id("retry-1"), "call-2");
    assert_eq!(second.resolve_id("retry-1"), "retry-1");

    first.reset();
    assert!(first.deduplicator().is_empty());
}
