//! Task graph tools:
//! - create_task
//! - get_ready_tasks
//! - add_dependency
//! - add_subtask
//! - mark_task_complete
//! - get_task_status
//! - list_tasks

use super::{task_error, TaskContext};
use async_trait::async_trait;
use mcp_server::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use todo_core::{Metadata, Task, TaskStatus};
use tracing::info;

fn parse_input<T: serde::de::DeserializeOwned>(input: Value) -> std::result::Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

// =============================================================================
// create_task
// =============================================================================

pub struct CreateTaskTool {
    ctx: TaskContext,
}

impl CreateTaskTool {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateInput {
    /// Unique task identifier
    task_id: String,
    /// Human-readable title
    title: String,
    /// Free-form annotations stored with the task
    #[serde(default)]
    metadata: Option<Metadata>,
    /// Caller-side bookkeeping stored with the task
    #[serde(default)]
    agent_context: Option<Metadata>,
    /// Ids of existing tasks this one depends on
    #[serde(default)]
    depends_on: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct CreateOutput {
    task_id: String,
}

#[async_trait]
impl Tool for CreateTaskTool {
    fn name(&self) -> &str {
        "create_task"
    }

    fn description(&self) -> Option<&str> {
        Some("Create a task, optionally depending on existing tasks")
    }

    fn input_schema(&self) -> Value {
        schemars::schema_for!(CreateInput).to_value()
    }

    async fn execute(&self, input: Value, _context: &ToolContext) -> std::result::Result<ToolResult, ToolError> {
        let input: CreateInput = parse_input(input)?;
        let task_id = input.task_id.clone();

        self.ctx
            .update(move |manager| {
                let mut task = Task::new(input.task_id, input.title);
                task.metadata = input.metadata.unwrap_or_default();
                task.agent_context = input.agent_context.unwrap_or_default();
                let id = task.id.clone();

                manager.add_task(task).map_err(task_error)?;
                for dep in input.depends_on.unwrap_or_default() {
                    manager.add_dependency(&id, &dep).map_err(task_error)?;
                }
                Ok(())
            })
            .await?;

        info!(task_id = %task_id, "Task created");
        ToolResult::from_serialize(&CreateOutput { task_id })
    }
}

// =============================================================================
// get_ready_tasks
// =============================================================================

pub struct GetReadyTasksTool {
    ctx: TaskContext,
}

impl GetReadyTasksTool {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct EmptyInput {}

#[async_trait]
impl Tool for GetReadyTasksTool {
    fn name(&self) -> &str {
        "get_ready_tasks"
    }

    fn description(&self) -> Option<&str> {
        Some("List the ids of all tasks that are ready to start")
    }

    fn input_schema(&self) -> Value {
        schemars::schema_for!(EmptyInput).to_value()
    }

    async fn execute(&self, _input: Value, _context: &ToolContext) -> std::result::Result<ToolResult, ToolError> {
        let ready: Vec<String> = self
            .ctx
            .read(|manager| Ok(manager.get_ready_tasks().into_iter().map(|t| t.id.clone()).collect()))
            .await?;

        ToolResult::from_serialize(&ready)
    }
}

// =============================================================================
// add_dependency
// =============================================================================

pub struct AddDependencyTool {
    ctx: TaskContext,
}

impl AddDependencyTool {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DependencyInput {
    /// Task that gains the dependency
    task_id: String,
    /// Task that must complete first
    depends_on: String,
}

#[derive(Debug, Serialize)]
struct DependencyOutput {
    task_id: String,
    depends_on: String,
    status: TaskStatus,
}

#[async_trait]
impl Tool for AddDependencyTool {
    fn name(&self) -> &str {
        "add_dependency"
    }

    fn description(&self) -> Option<&str> {
        Some("Make a task depend on another; rejected if it would create a cycle")
    }

    fn input_schema(&self) -> Value {
        schemars::schema_for!(DependencyInput).to_value()
    }

    async fn execute(&self, input: Value, _context: &ToolContext) -> std::result::Result<ToolResult, ToolError> {
        let DependencyInput { task_id, depends_on } = parse_input(input)?;

        let output = self
            .ctx
            .update(move |manager| {
                manager.add_dependency(&task_id, &depends_on).map_err(task_error)?;
                let status = manager.task_status(&task_id).map_err(task_error)?;
                Ok(DependencyOutput {
                    task_id,
                    depends_on,
                    status,
                })
            })
            .await?;

        ToolResult::from_serialize(&output)
    }
}

// =============================================================================
// add_subtask
// =============================================================================

pub struct AddSubtaskTool {
    ctx: TaskContext,
}

impl AddSubtaskTool {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct SubtaskInput {
    /// Parent task
    parent_id: String,
    /// Task that becomes a child of the parent
    subtask_id: String,
}

#[async_trait]
impl Tool for AddSubtaskTool {
    fn name(&self) -> &str {
        "add_subtask"
    }

    fn description(&self) -> Option<&str> {
        Some("Attach a task as a subtask; the parent completes when all subtasks do")
    }

    fn input_schema(&self) -> Value {
        schemars::schema_for!(SubtaskInput).to_value()
    }

    async fn execute(&self, input: Value, _context: &ToolContext) -> std::result::Result<ToolResult, ToolError> {
        let input: SubtaskInput = parse_input(input)?;

        let output = self
            .ctx
            .update(move |manager| {
                manager
                    .add_subtask(&input.parent_id, &input.subtask_id)
                    .map_err(task_error)?;
                Ok(input)
            })
            .await?;

        ToolResult::from_serialize(&output)
    }
}

// =============================================================================
// mark_task_complete
// =============================================================================

pub struct MarkTaskCompleteTool {
    ctx: TaskContext,
}

impl MarkTaskCompleteTool {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct TaskIdInput {
    /// Task identifier
    task_id: String,
}

#[derive(Debug, Serialize)]
struct CompleteOutput {
    task_id: String,
    unblocked: Vec<String>,
    parent_completed: Option<String>,
}

#[async_trait]
impl Tool for MarkTaskCompleteTool {
    fn name(&self) -> &str {
        "mark_task_complete"
    }

    fn description(&self) -> Option<&str> {
        Some("Mark a task completed and unblock the tasks waiting on it")
    }

    fn input_schema(&self) -> Value {
        schemars::schema_for!(TaskIdInput).to_value()
    }

    async fn execute(&self, input: Value, _context: &ToolContext) -> std::result::Result<ToolResult, ToolError> {
        let TaskIdInput { task_id } = parse_input(input)?;

        let output = self
            .ctx
            .update(move |manager| {
                let completion = manager.mark_complete(&task_id).map_err(task_error)?;
                Ok(CompleteOutput {
                    task_id,
                    unblocked: completion.unblocked,
                    parent_completed: completion.parent_completed,
                })
            })
            .await?;

        ToolResult::from_serialize(&output)
    }
}

// =============================================================================
// get_task_status
// =============================================================================

pub struct GetTaskStatusTool {
    ctx: TaskContext,
}

impl GetTaskStatusTool {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    id: String,
    status: TaskStatus,
    metadata: Metadata,
    blocked_by: Vec<String>,
}

#[async_trait]
impl Tool for GetTaskStatusTool {
    fn name(&self) -> &str {
        "get_task_status"
    }

    fn description(&self) -> Option<&str> {
        Some("Get a task's status, metadata and unfinished dependencies")
    }

    fn input_schema(&self) -> Value {
        schemars::schema_for!(TaskIdInput).to_value()
    }

    async fn execute(&self, input: Value, _context: &ToolContext) -> std::result::Result<ToolResult, ToolError> {
        let TaskIdInput { task_id } = parse_input(input)?;

        let output = self
            .ctx
            .read(move |manager| {
                let task = manager.get_task(&task_id).map_err(task_error)?;
                Ok(StatusOutput {
                    id: task.id.clone(),
                    status: task.status(),
                    metadata: task.metadata.clone(),
                    blocked_by: manager.get_unmet_dependencies(&task_id).map_err(task_error)?,
                })
            })
            .await?;

        ToolResult::from_serialize(&output)
    }
}

// =============================================================================
// list_tasks
// =============================================================================

pub struct ListTasksTool {
    ctx: TaskContext,
}

impl ListTasksTool {
    pub fn new(ctx: TaskContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> Option<&str> {
        Some("List every task record, dependencies before dependents")
    }

    fn input_schema(&self) -> Value {
        schemars::schema_for!(EmptyInput).to_value()
    }

    async fn execute(&self, _input: Value, _context: &ToolContext) -> std::result::Result<ToolResult, ToolError> {
        let tasks = self
            .ctx
            .read(|manager| ToolResult::from_serialize(&manager.topological_order()))
            .await?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::build_registry;
    use serde_json::json;
    use std::sync::Arc;
    use todo_core::{MemoryStorage, TaskStorage};

    fn setup() -> (ToolRegistry, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let registry = build_registry(TaskContext::new(storage.clone())).unwrap();
        (registry, storage)
    }

    async fn call(registry: &ToolRegistry, tool: &str, input: Value) -> std::result::Result<Value, ToolError> {
        registry
            .call(tool, input, &ToolContext::new())
            .await
            .map(ToolResult::into_value)
    }

    #[tokio::test]
    async fn test_create_and_status() {
        let (registry, _) = setup();

        let created = call(
            &registry,
            "create_task",
            json!({"task_id": "a", "title": "Task A", "metadata": {"owner": "alice"}}),
        )
        .await
        .unwrap();
        assert_eq!(created, json!({"task_id": "a"}));

        let status = call(&registry, "get_task_status", json!({"task_id": "a"})).await.unwrap();
        assert_eq!(
            status,
            json!({"id": "a", "status": "READY", "metadata": {"owner": "alice"}, "blocked_by": []})
        );
    }

    #[tokio::test]
    async fn test_create_with_dependencies() {
        let (registry, _) = setup();
        call(&registry, "create_task", json!({"task_id": "a", "title": "A"})).await.unwrap();
        call(&registry, "create_task", json!({"task_id": "b", "title": "B"})).await.unwrap();
        call(
            &registry,
            "create_task",
            json!({"task_id": "c", "title": "C", "depends_on": ["a", "b"]}),
        )
        .await
        .unwrap();

        let status = call(&registry, "get_task_status", json!({"task_id": "c"})).await.unwrap();
        assert_eq!(status["status"], json!("BLOCKED"));
        assert_eq!(status["blocked_by"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_failed_create_persists_nothing() {
        let (registry, storage) = setup();
        call(&registry, "create_task", json!({"task_id": "a", "title": "A"})).await.unwrap();

        let err = call(
            &registry,
            "create_task",
            json!({"task_id": "b", "title": "B", "depends_on": ["a", "ghost"]}),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "task_not_found");

        let manager = storage.load().unwrap();
        assert!(!manager.contains("b"));
        assert!(manager.get_task("a").unwrap().dependents().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_create() {
        let (registry, _) = setup();
        call(&registry, "create_task", json!({"task_id": "a", "title": "A"})).await.unwrap();

        let err = call(&registry, "create_task", json!({"task_id": "a", "title": "Again"}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "duplicate_task");
        assert_eq!(err.to_string(), "Task with id 'a' already exists");
    }

    #[tokio::test]
    async fn test_dependency_cycle_and_completion() {
        let (registry, _) = setup();
        for id in ["a", "b"] {
            call(&registry, "create_task", json!({"task_id": id, "title": id})).await.unwrap();
        }

        let added = call(&registry, "add_dependency", json!({"task_id": "b", "depends_on": "a"}))
            .await
            .unwrap();
        assert_eq!(added, json!({"task_id": "b", "depends_on": "a", "status": "BLOCKED"}));

        let err = call(&registry, "add_dependency", json!({"task_id": "a", "depends_on": "b"}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "circular_dependency");

        assert_eq!(call(&registry, "get_ready_tasks", json!({})).await.unwrap(), json!(["a"]));

        let done = call(&registry, "mark_task_complete", json!({"task_id": "a"})).await.unwrap();
        assert_eq!(
            done,
            json!({"task_id": "a", "unblocked": ["b"], "parent_completed": null})
        );
        assert_eq!(call(&registry, "get_ready_tasks", Value::Null).await.unwrap(), json!(["b"]));
    }

    #[tokio::test]
    async fn test_subtasks_complete_parent() {
        let (registry, _) = setup();
        for id in ["p", "s"] {
            call(&registry, "create_task", json!({"task_id": id, "title": id})).await.unwrap();
        }

        let linked = call(&registry, "add_subtask", json!({"parent_id": "p", "subtask_id": "s"}))
            .await
            .unwrap();
        assert_eq!(linked, json!({"parent_id": "p", "subtask_id": "s"}));

        let done = call(&registry, "mark_task_complete", json!({"task_id": "s"})).await.unwrap();
        assert_eq!(done["parent_completed"], json!("p"));
    }

    #[tokio::test]
    async fn test_list_tasks_in_dependency_order() {
        let (registry, _) = setup();
        call(&registry, "create_task", json!({"task_id": "z", "title": "Z"})).await.unwrap();
        call(
            &registry,
            "create_task",
            json!({"task_id": "a", "title": "A", "depends_on": ["z"], "agent_context": {"run": 1}}),
        )
        .await
        .unwrap();

        let listed = call(&registry, "list_tasks", json!({})).await.unwrap();
        let tasks = listed.as_array().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0]["id"], json!("z"));
        assert_eq!(tasks[1]["id"], json!("a"));
        assert_eq!(tasks[1]["dependencies"], json!(["z"]));
        assert_eq!(tasks[1]["agent_context"], json!({"run": 1}));
    }

    #[tokio::test]
    async fn test_unknown_task_errors() {
        let (registry, _) = setup();
        for tool in ["mark_task_complete", "get_task_status"] {
            let err = call(&registry, tool, json!({"task_id": "ghost"})).await.unwrap_err();
            assert_eq!(err.code(), "task_not_found");
            assert_eq!(err.to_string(), "Task not found: ghost");
        }
    }

    #[tokio::test]
    async fn test_schema_rejects_bad_input() {
        let (registry, _) = setup();
        let err = call(&registry, "create_task", json!({"task_id": "a"})).await.unwrap_err();
        assert_eq!(err.code(), "invalid_input");

        let err = call(&registry, "add_dependency", json!({"task_id": "a", "depends_on": ["b"]}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn test_registry_order() {
        let (registry, _) = setup();
        assert_eq!(
            registry.names(),
            vec![
                "create_task",
                "get_ready_tasks",
                "add_dependency",
                "add_subtask",
                "mark_task_complete",
                "get_task_status",
                "export_html",
                "list_tasks",
            ]
        );
    }
}
