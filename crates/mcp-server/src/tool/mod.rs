//! Tool system.
//!
//! - [`Tool`]: the trait every operation implements
//! - [`ToolRegistry`]: immutable name → tool mapping built once at startup
//! - [`ToolContext`]: per-call information handed to the tool
//! - [`ToolResult`]: the JSON value a tool produces
//!
//! # Quick Start
//!
//! ```
//! use mcp_server::tool::{Tool, ToolContext, ToolRegistry, ToolResult};
//! use mcp_server::error::ToolError;
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//!
//! struct EchoTool;
//!
//! #[async_trait]
//! impl Tool for EchoTool {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     fn input_schema(&self) -> Value {
//!         json!({
//!             "type": "object",
//!             "properties": { "message": { "type": "string" } },
//!             "required": ["message"]
//!         })
//!     }
//!
//!     async fn execute(&self, input: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
//!         Ok(ToolResult::success_json(input["message"].clone()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = ToolRegistry::builder().register(EchoTool).build().unwrap();
//!     let result = registry
//!         .call("echo", json!({"message": "hi"}), &ToolContext::new())
//!         .await
//!         .unwrap();
//!     assert_eq!(result.value(), &json!("hi"));
//! }
//! ```

mod context;
mod registry;
mod result;
mod traits;

pub use context::ToolContext;
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use result::ToolResult;
pub use traits::Tool;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata describing a registered tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// The unique name of the tool
    pub name: String,

    /// Optional description of what the tool does
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON schema of the accepted input
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}
