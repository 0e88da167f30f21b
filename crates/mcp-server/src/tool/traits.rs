//! Tool trait definition.

use super::{ToolContext, ToolDefinition, ToolResult};
use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::Value;

/// A named operation callable through the server.
///
/// Input is validated against [`input_schema`](Tool::input_schema) by the
/// registry before `execute` runs, so implementations can deserialize it
/// into their typed input struct directly.
///
/// # Examples
///
/// ```
/// use mcp_server::tool::{Tool, ToolContext, ToolResult};
/// use mcp_server::error::ToolError;
/// use async_trait::async_trait;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
/// use serde_json::{json, Value};
///
/// #[derive(Deserialize, JsonSchema)]
/// struct AddInput {
///     a: f64,
///     b: f64,
/// }
///
/// struct AddTool;
///
/// #[async_trait]
/// impl Tool for AddTool {
///     fn name(&self) -> &str {
///         "add"
///     }
///
///     fn description(&self) -> Option<&str> {
///         Some("Adds two numbers")
///     }
///
///     fn input_schema(&self) -> Value {
///         schemars::schema_for!(AddInput).to_value()
///     }
///
///     async fn execute(&self, input: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
///         let input: AddInput = serde_json::from_value(input)?;
///         Ok(ToolResult::success_json(json!(input.a + input.b)))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of this tool within a registry.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> Option<&str> {
        None
    }

    /// JSON schema of the accepted input object.
    fn input_schema(&self) -> Value;

    /// Run the tool.
    async fn execute(&self, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError>;

    /// Listing entry for this tool.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().map(str::to_string),
            input_schema: self.input_schema(),
        }
    }
}
