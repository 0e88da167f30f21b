//! export_html tool

use super::TaskContext;
use crate::export::render_html;
use async_trait::async_trait;
use mcp_server::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::info;

pub struct ExportHtmlTool {
    ctx: TaskContext,
}

impl ExportHtmlTool {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ExportInput {
    /// Destination file for the HTML page
    path: String,
}

#[derive(Debug, Serialize)]
struct ExportOutput {
    path: String,
    tasks: usize,
}

#[async_trait]
impl Tool for ExportHtmlTool {
    fn name(&self) -> &str {
        "export_html"
    }

    fn description(&self) -> Option<&str> {
        Some("Write all tasks to an HTML page")
    }

    fn input_schema(&self) -> Value {
        schemars::schema_for!(ExportInput).to_value()
    }

    async fn execute(&self, input: Value, _context: &ToolContext) -> std::result::Result<ToolResult, ToolError> {
        let ExportInput { path } = serde_json::from_value(input)?;

        let (html, count) = self
            .ctx
            .read(|manager| Ok((render_html(&manager.topological_order()), manager.len())))
            .await?;

        let target = Path::new(&path);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::ExecutionFailed(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(target, html)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to write {}: {}", path, e)))?;

        info!(path = %path, tasks = count, "Exported tasks to HTML");
        ToolResult::from_serialize(&ExportOutput { path, tasks: count })
    }
}
