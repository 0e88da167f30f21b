//! Request loop tying a [`ToolRegistry`] to a [`Transport`].

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{McpError, Result, TransportError};
use crate::protocol::{ToolRequest, ToolResponse, ToolsAnnouncement};
use crate::tool::{ToolContext, ToolRegistry};
use crate::transport::{StdioTransport, Transport};

/// Serves tool calls until the transport reaches EOF.
///
/// # Examples
///
/// ```
/// use mcp_server::server::ToolServer;
/// use mcp_server::tool::ToolRegistry;
/// use mcp_server::transport::LineTransport;
///
/// #[tokio::main]
/// async fn main() {
///     let server = ToolServer::new(ToolRegistry::builder().build().unwrap());
///     let mut transport = LineTransport::new(&b"{\"tool\":\"missing\"}\n"[..], Vec::new());
///
///     server.serve(&mut transport).await.unwrap();
///
///     let (_, output) = transport.into_inner();
///     let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
///     assert_eq!(lines[0], r#"{"info":"tools","names":[]}"#);
///     assert!(lines[1].contains("tool_not_found"));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ToolServer {
    registry: ToolRegistry,
    announce_tools: bool,
}

impl ToolServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            announce_tools: true,
        }
    }

    /// Toggle the startup line listing tool names.
    pub fn with_announcement(mut self, enabled: bool) -> Self {
        self.announce_tools = enabled;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn announcement(&self) -> ToolsAnnouncement {
        ToolsAnnouncement::new(self.registry.names())
    }

    /// Execute one request and build its response.
    pub async fn handle(&self, request: ToolRequest) -> ToolResponse {
        let ToolRequest { tool, input, id } = request;
        let context = ToolContext::for_request(id.clone());

        match self.registry.call(&tool, input, &context).await {
            Ok(result) => {
                debug!(tool = %tool, "Tool call succeeded");
                ToolResponse::success(id, result.into_value())
            }
            Err(e) => {
                warn!(tool = %tool, code = e.code(), error = %e, "Tool call failed");
                ToolResponse::from_tool_error(id, &e)
            }
        }
    }

    /// Run the request loop on `transport`.
    ///
    /// Every request line yields exactly one response line; undecodable
    /// lines are answered with an `invalid_message` error. Returns when the
    /// input ends, or with an error if the transport itself fails.
    pub async fn serve<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<()> {
        info!(tools = self.registry.count(), "Tool server started");

        if self.announce_tools {
            transport.send(to_message(&self.announcement())?).await?;
        }

        let mut handled = 0usize;
        while let Some(message) = transport.recv().await {
            let response = match message {
                Ok(request) => self.handle(request).await,
                Err(e @ TransportError::InvalidMessage(_)) => ToolResponse::from_transport_error(&e),
                Err(e) => return Err(e.into()),
            };

            transport.send(to_message(&response)?).await?;
            handled += 1;
        }

        transport.close().await?;
        info!(requests = handled, "Tool server stopped");
        Ok(())
    }

    /// Serve over the process's stdin and stdout.
    pub async fn serve_stdio(&self) -> Result<()> {
        let mut transport = StdioTransport::stdio();
        self.serve(&mut transport).await
    }
}

fn to_message<T: Serialize>(message: &T) -> Result<Value> {
    serde_json::to_value(message).map_err(|e| McpError::Transport(TransportError::InvalidMessage(e.to_string())))
}
