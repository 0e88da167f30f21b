//! Tool registry.

use super::{Tool, ToolContext, ToolDefinition, ToolResult};
use crate::error::ToolError;
use jsonschema::Validator;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Immutable name → tool mapping.
///
/// Built once through [`ToolRegistry::builder`]; listing follows
/// registration order. Each tool's input schema is compiled at build time.
/// Cloning is cheap and clones share the tools.
///
/// # Examples
///
/// ```
/// use mcp_server::tool::{Tool, ToolRegistry, ToolContext, ToolResult};
/// use mcp_server::error::ToolError;
/// use async_trait::async_trait;
/// use serde_json::{json, Value};
///
/// struct MyTool;
///
/// #[async_trait]
/// impl Tool for MyTool {
///     fn name(&self) -> &str { "my_tool" }
///     fn input_schema(&self) -> Value { json!({"type": "object"}) }
///     async fn execute(&self, _: Value, _: &ToolContext) -> Result<ToolResult, ToolError> {
///         Ok(ToolResult::success_json(json!(null)))
///     }
/// }
///
/// // Registering the same name twice fails at build time
/// let result = ToolRegistry::builder().register(MyTool).register(MyTool).build();
/// assert!(matches!(result, Err(ToolError::AlreadyRegistered(_))));
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    validators: Vec<Arc<Validator>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Gets a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Definitions of all tools in registration order.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate `input` and run the named tool.
    ///
    /// A `null` input is treated as an empty object.
    pub async fn call(&self, name: &str, input: Value, context: &ToolContext) -> Result<ToolResult, ToolError> {
        let &i = self
            .index
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        let tool = &self.tools[i];

        let input = match input {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };

        let errors: Vec<String> = self.validators[i].iter_errors(&input).map(|e| e.to_string()).collect();
        if !errors.is_empty() {
            return Err(ToolError::InvalidInput(errors.join("; ")));
        }

        debug!(tool = name, request_id = ?context.request_id(), "Executing tool");
        tool.execute(input, context).await
    }
}

/// Collects tools for a [`ToolRegistry`].
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn register<T: Tool + 'static>(self, tool: T) -> Self {
        self.register_arc(Arc::new(tool))
    }

    /// Registers a tool that is already Arc-wrapped.
    pub fn register_arc(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Finish registration.
    ///
    /// # Errors
    ///
    /// `ToolError::AlreadyRegistered` if two tools share a name,
    /// `ToolError::Internal` if a tool's input schema does not compile.
    pub fn build(self) -> Result<ToolRegistry, ToolError> {
        let mut index = HashMap::with_capacity(self.tools.len());
        let mut validators = Vec::with_capacity(self.tools.len());

        for (i, tool) in self.tools.iter().enumerate() {
            let name = tool.name().to_string();
            if index.contains_key(&name) {
                return Err(ToolError::AlreadyRegistered(name));
            }
            let validator = jsonschema::validator_for(&tool.input_schema()).map_err(|e| {
                ToolError::Internal(anyhow::anyhow!("Failed to compile input schema for {}: {}", name, e))
            })?;
            validators.push(Arc::new(validator));
            index.insert(name, i);
        }

        Ok(ToolRegistry {
            tools: self.tools,
            validators,
            index,
        })
    }
}
