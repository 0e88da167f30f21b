//! Task tools
//!
//! Every tool loads the task graph from storage, applies one operation and
//! saves only if the operation succeeded. Calls are serialized so concurrent
//! requests never interleave a load with another call's save.

mod export;
mod tasks;

pub use export::ExportHtmlTool;
pub use tasks::{
    AddDependencyTool, AddSubtaskTool, CreateTaskTool, GetReadyTasksTool, GetTaskStatusTool, ListTasksTool,
    MarkTaskCompleteTool,
};

use mcp_server::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;
use todo_core::{StorageError, TaskError, TaskManager, TaskStorage};

// =============================================================================
// Shared Context
// =============================================================================

/// Shared context for all task tools
#[derive(Clone)]
pub struct TaskContext {
    storage: Arc<dyn TaskStorage>,
    lock: Arc<Mutex<()>>,
}

impl TaskContext {
    pub fn new(storage: Arc<dyn TaskStorage>) -> Self {
        Self {
            storage,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Run `op` against a freshly loaded graph without saving.
    pub(crate) async fn read<T, F>(&self, op: F) -> std::result::Result<T, ToolError>
    where
        F: FnOnce(&TaskManager) -> std::result::Result<T, ToolError> + Send,
    {
        let _guard = self.lock.lock().await;
        let manager = self.load().await?;
        op(&manager)
    }

    /// Run `op` against a freshly loaded graph and persist it on success.
    pub(crate) async fn update<T, F>(&self, op: F) -> std::result::Result<T, ToolError>
    where
        F: FnOnce(&mut TaskManager) -> std::result::Result<T, ToolError> + Send,
    {
        let _guard = self.lock.lock().await;
        let mut manager = self.load().await?;
        let output = op(&mut manager)?;
        self.save(manager).await?;
        Ok(output)
    }

    // Storage does blocking file IO, keep it off the runtime threads.
    async fn load(&self) -> std::result::Result<TaskManager, ToolError> {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || storage.load())
            .await
            .map_err(join_error)?
            .map_err(storage_error)
    }

    async fn save(&self, manager: TaskManager) -> std::result::Result<(), ToolError> {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || storage.save(&manager))
            .await
            .map_err(join_error)?
            .map_err(storage_error)
    }
}

fn join_error(err: tokio::task::JoinError) -> ToolError {
    ToolError::Internal(anyhow::anyhow!("Storage task failed: {}", err))
}

pub(crate) fn task_error(err: TaskError) -> ToolError {
    ToolError::rejected(err.code(), err.to_string())
}

pub(crate) fn storage_error(err: StorageError) -> ToolError {
    ToolError::rejected(err.code(), err.to_string())
}

/// Build the registry with every task tool.
pub fn build_registry(ctx: TaskContext) -> std::result::Result<ToolRegistry, ToolError> {
    ToolRegistry::builder()
        .register(CreateTaskTool::new(ctx.clone()))
        .register(GetReadyTasksTool::new(ctx.clone()))
        .register(AddDependencyTool::new(ctx.clone()))
        .register(AddSubtaskTool::new(ctx.clone()))
        .register(MarkTaskCompleteTool::new(ctx.clone()))
        .register(GetTaskStatusTool::new(ctx.clone()))
        .register(ExportHtmlTool::new(ctx.clone()))
        .register(ListTasksTool::new(ctx))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::time::Duration;
    use todo_core::MemoryStorage;

    /// Storage whose `load` blocks until the test opens the gate.
    struct GatedStorage {
        gate: std::sync::Mutex<Receiver<()>>,
        inner: MemoryStorage,
    }

    impl GatedStorage {
        fn new() -> (Self, Sender<()>) {
            let (tx, rx) = mpsc::channel();
            let storage = Self {
                gate: std::sync::Mutex::new(rx),
                inner: MemoryStorage::new(),
            };
            (storage, tx)
        }
    }

    impl TaskStorage for GatedStorage {
        fn load(&self) -> std::result::Result<TaskManager, StorageError> {
            let opened = self.gate.lock().unwrap().recv_timeout(Duration::from_secs(2));
            match opened {
                Ok(()) => self.inner.load(),
                Err(e) => Err(StorageError::io(
                    "gate",
                    std::io::Error::new(std::io::ErrorKind::TimedOut, e.to_string()),
                )),
            }
        }

        fn save(&self, manager: &TaskManager) -> std::result::Result<(), StorageError> {
            self.inner.save(manager)
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_storage_io_does_not_block_the_runtime() {
        let (storage, gate) = GatedStorage::new();
        let registry = build_registry(TaskContext::new(Arc::new(storage))).unwrap();

        // On a single-threaded runtime the gate can only open while the load
        // waits on another thread.
        let ctx = ToolContext::new();
        let (result, _) = tokio::join!(
            registry.call("get_ready_tasks", json!({}), &ctx),
            async { gate.send(()).unwrap() },
        );

        assert_eq!(result.unwrap().into_value(), json!([]));
    }

    #[tokio::test]
    async fn test_failed_update_is_not_saved() {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = TaskContext::new(storage.clone());

        let err = ctx
            .update(|manager| {
                manager.add_task(todo_core::Task::new("a", "A")).map_err(task_error)?;
                manager.add_dependency("a", "ghost").map_err(task_error)
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "task_not_found");
        assert!(storage.snapshot().is_none());
    }
}
