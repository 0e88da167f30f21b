//! Typed tool registry and line-delimited JSON server.
//!
//! Operations are implemented as [`Tool`](tool::Tool)s, collected once into a
//! [`ToolRegistry`](tool::ToolRegistry) and served by a
//! [`ToolServer`](server::ToolServer) over any [`Transport`](transport::Transport),
//! stdin/stdout by default. See [`protocol`] for the message shapes.

pub mod error;
pub mod protocol;
pub mod server;
pub mod tool;
pub mod transport;

/// Common imports for tool implementations.
pub mod prelude {
    pub use crate::error::{McpError, Result, ToolError, TransportError};
    pub use crate::protocol::{ToolRequest, ToolResponse, ToolsAnnouncement};
    pub use crate::server::ToolServer;
    pub use crate::tool::{Tool, ToolContext, ToolDefinition, ToolRegistry, ToolResult};
    pub use crate::transport::{LineTransport, StdioTransport, Transport};
    pub use async_trait::async_trait;
}
