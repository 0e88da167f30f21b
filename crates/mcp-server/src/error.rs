//! Error types for the tool server.
//!
//! # Error Hierarchy
//!
//! ```text
//! McpError (top-level)
//! ├── Transport(TransportError)
//! └── Tool(ToolError)
//! ```
//!
//! Every error that reaches the wire carries a stable machine-readable code,
//! see [`ToolError::code`] and [`TransportError::code`].
//!
//! # Examples
//!
//! ```rust
//! use mcp_server::error::{McpError, ToolError};
//!
//! fn may_fail() -> Result<(), McpError> {
//!     Err(ToolError::NotFound("my_tool".to_string()).into())
//! }
//!
//! assert!(may_fail().is_err());
//! ```

use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, McpError>;

/// Top-level error type for the server.
#[derive(Debug, Error)]
pub enum McpError {
    /// Transport-layer error (I/O, framing).
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Tool registration or execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

/// Errors raised while registering or calling tools.
///
/// # Examples
///
/// ```rust
/// use mcp_server::error::ToolError;
///
/// let err = ToolError::rejected("task_not_found", "Task not found: a");
/// assert_eq!(err.code(), "task_not_found");
/// assert_eq!(err.to_string(), "Task not found: a");
/// ```
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// A tool with the same name was registered twice.
    #[error("Tool already registered: {0}")]
    AlreadyRegistered(String),

    /// The input does not match the tool's schema.
    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    /// The tool ran and refused the operation with a domain error.
    ///
    /// `code` is surfaced verbatim to the client so callers can branch on it.
    #[error("{message}")]
    Rejected { code: String, message: String },

    /// The tool failed for a reason that has no dedicated code.
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    /// Unexpected internal failure.
    #[error("Internal tool error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    /// Domain error carrying its own code.
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &str {
        match self {
            ToolError::NotFound(_) => "tool_not_found",
            ToolError::InvalidInput(_) => "invalid_input",
            ToolError::Rejected { code, .. } => code,
            ToolError::ExecutionFailed(_) => "execution_failed",
            ToolError::AlreadyRegistered(_) | ToolError::Internal(_) => "internal_error",
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::InvalidInput(err.to_string())
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport is closed.
    #[error("Connection closed")]
    Closed,

    /// A line could not be decoded as a request.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

impl TransportError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            TransportError::InvalidMessage(_) => "invalid_message",
            TransportError::Io(_) | TransportError::Closed => "internal_error",
        }
    }
}
