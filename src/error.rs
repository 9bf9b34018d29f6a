//! Error types for Sleuth.

use crate::response::ParseError;
use thiserror::Error;

/// Library-level error type for Sleuth operations.
#[derive(Error, Debug)]
pub enum SleuthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Agent execution failed: {0}")]
    AgentExecution(String),

    #[error("Agent exceeded maximum iterations ({0}) without producing an answer")]
    ToolLoopExceeded(usize),

    #[error("Failed to parse research response: {}", .0.message)]
    SchemaValidation(Box<ParseError>),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SleuthError {
    /// Whether the caller may reasonably retry the same (or a rephrased) query.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SleuthError::AgentExecution(_)
                | SleuthError::ToolLoopExceeded(_)
                | SleuthError::SchemaValidation(_)
                | SleuthError::OpenAI(_)
                | SleuthError::Http(_)
        )
    }

    /// The parse failure details, if this is a schema validation error.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            SleuthError::SchemaValidation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for SleuthError {
    fn from(e: ParseError) -> Self {
        SleuthError::SchemaValidation(Box::new(e))
    }
}

/// Result type alias for Sleuth operations.
pub type Result<T> = std::result::Result<T, SleuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(SleuthError::AgentExecution("down".to_string()).is_retryable());
        assert!(SleuthError::ToolLoopExceeded(15).is_retryable());
        assert!(!SleuthError::Config("missing key".to_string()).is_retryable());
        assert!(!SleuthError::InvalidInput("empty".to_string()).is_retryable());
    }
}
