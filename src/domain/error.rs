//! Error types for scriptscope analysis

use thiserror::Error;

/// Failure of a single analysis call. No records are produced when one occurs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Source text is not valid for the selected dialect.
    #[error("Parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A slot the grammar guarantees is missing from the parser's output.
    #[error("Malformed {kind} node: missing required '{slot}'")]
    MalformedNode { kind: String, slot: String },

    /// Input nests deeper than the configured limit.
    #[error("Nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// Input could not be read as a syntax tree at all.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AnalysisError {
    pub fn malformed(kind: impl Into<String>, slot: impl Into<String>) -> Self {
        AnalysisError::MalformedNode {
            kind: kind.into(),
            slot: slot.into(),
        }
    }
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
