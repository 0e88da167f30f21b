//! Tool result type.

use crate::error::ToolError;
use serde::Serialize;
use serde_json::Value;

/// Successful output of a tool: an arbitrary JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    value: Value,
}

impl ToolResult {
    pub fn success_json(value: Value) -> Self {
        Self { value }
    }

    /// Serialize a typed output.
    ///
    /// ```
    /// use mcp_server::tool::ToolResult;
    /// use serde_json::json;
    ///
    /// let result = ToolResult::from_serialize(&vec!["a", "b"]).unwrap();
    /// assert_eq!(result.value(), &json!(["a", "b"]));
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(output: &T) -> Result<Self, ToolError> {
        let value = serde_json::to_value(output)
            .map_err(|e| ToolError::Internal(anyhow::anyhow!("Failed to serialize tool output: {}", e)))?;
        Ok(Self { value })
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl From<Value> for ToolResult {
    fn from(value: Value) -> Self {
        Self::success_json(value)
    }
}
