//! Core Error Types
//!
//! Errors shared by the workspace crates. Dependency-free apart from
//! thiserror and serde_json so the extractor crate stays light.
//!
//! The main crate wraps these in its own `AppError`.

use thiserror::Error;

/// Core error type for the agent orchestrator workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required provider field is absent or blank
    #[error("Provider configuration is missing {0}")]
    MissingField(&'static str),

    /// Arguments of a tool call don't match the expected shape
    #[error("Invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    /// The tool call is still being streamed and can't be acted on
    #[error("Tool call '{0}' is still streaming")]
    StillStreaming(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn invalid_arguments(tool: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            source,
        }
    }
}

impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = CoreError::MissingField("apiKey");
        assert_eq!(err.to_string(), "Provider configuration is missing apiKey");
    }

    #[test]
    fn test_invalid_arguments_names_tool() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let msg: String = CoreError::invalid_arguments("agent_write_file", source).into();
        assert!(msg.starts_with("Invalid arguments for tool 'agent_write_file'"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let core_err: CoreError = serde_err.into();
        assert!(matches!(core_err, CoreError::Serialization(_)));
    }
}
