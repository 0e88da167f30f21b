//! Wire protocol messages.
//!
//! One JSON document per line in each direction:
//!
//! - server → client, once at start: `{"info":"tools","names":[...]}`
//! - client → server: `{"tool": "...", "input": {...}, "id": ...}`
//! - server → client: `{"result": ...}` or `{"error": "...", "code": "..."}`
//!
//! `input` defaults to an empty object and `id`, when present, is echoed
//! back on the response.
//!
//! # Examples
//!
//! ```
//! use mcp_server::protocol::{ToolRequest, ToolResponse};
//! use serde_json::json;
//!
//! let request: ToolRequest = serde_json::from_str(r#"{"tool":"ping","id":7}"#).unwrap();
//! assert_eq!(request.input, json!({}));
//!
//! let response = ToolResponse::success(request.id, json!("pong"));
//! assert_eq!(serde_json::to_value(&response).unwrap(), json!({"result": "pong", "id": 7}));
//! ```

use crate::error::{ToolError, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Registered tool name
    pub tool: String,

    /// Tool arguments
    #[serde(default = "empty_object")]
    pub input: Value,

    /// Caller-chosen correlation id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

impl ToolRequest {
    pub fn new(tool: impl Into<String>, input: Value) -> Self {
        Self {
            tool: tool.into(),
            input,
            id: None,
        }
    }

    pub fn with_id(mut self, id: Value) -> Self {
        self.id = Some(id);
        self
    }
}

/// Outcome of a request, exactly one per request line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResponse {
    Success {
        result: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
    },
    Error {
        error: String,
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
    },
}

impl ToolResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self::Success { result, id }
    }

    pub fn error(id: Option<Value>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
            code: code.into(),
            id,
        }
    }

    pub fn from_tool_error(id: Option<Value>, err: &ToolError) -> Self {
        Self::error(id, err.code(), err.to_string())
    }

    pub fn from_transport_error(err: &TransportError) -> Self {
        Self::error(None, err.code(), err.to_string())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn id(&self) -> Option<&Value> {
        match self {
            Self::Success { id, .. } | Self::Error { id, .. } => id.as_ref(),
        }
    }
}

/// Startup line listing every registered tool name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsAnnouncement {
    pub info: String,
    pub names: Vec<String>,
}

impl ToolsAnnouncement {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            info: "tools".to_string(),
            names,
        }
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}
