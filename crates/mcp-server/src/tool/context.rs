//! Tool execution context.

use serde_json::Value;

/// Per-call information passed to every [`Tool::execute`](super::Tool::execute).
///
/// ```
/// use mcp_server::tool::ToolContext;
/// use serde_json::json;
///
/// let context = ToolContext::for_request(Some(json!(42)));
/// assert_eq!(context.request_id(), Some(&json!(42)));
/// assert!(ToolContext::new().request_id().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    /// Correlation id from the request line
    request_id: Option<Value>,
}

impl ToolContext {
    /// Context for a call made outside any request, e.g. from a CLI.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_request(request_id: Option<Value>) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> Option<&Value> {
        self.request_id.as_ref()
    }
}
