//! Task dependency coordinator served as JSON tools.
//!
//! [`TodoMcpServer`] wires file-backed task storage into a
//! [`ToolRegistry`] and serves it over stdin/stdout. The same registry backs
//! the command-line subcommands.

pub mod config;
pub mod export;
pub mod logging;
pub mod tools;

use mcp_server::prelude::*;
use std::sync::Arc;
use todo_core::TaskStorage;

pub use config::{ConfigError, LogFormat, TodoConfig};
pub use tools::{build_registry, TaskContext};

/// Task tools plus the server loop that exposes them.
pub struct TodoMcpServer {
    server: ToolServer,
}

impl TodoMcpServer {
    pub fn new(storage: Arc<dyn TaskStorage>) -> Result<Self> {
        let registry = build_registry(TaskContext::new(storage))?;
        Ok(Self {
            server: ToolServer::new(registry),
        })
    }

    /// Toggle the startup tool announcement line.
    pub fn with_announcement(mut self, enabled: bool) -> Self {
        self.server = self.server.with_announcement(enabled);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.server.registry()
    }

    pub async fn serve<T: Transport + ?Sized>(&self, transport: &mut T) -> Result<()> {
        self.server.serve(transport).await
    }

    pub async fn serve_stdio(&self) -> Result<()> {
        self.server.serve_stdio().await
    }
}
