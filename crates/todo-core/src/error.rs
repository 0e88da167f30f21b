//! Error types for the task coordinator.

use std::path::PathBuf;

/// Result type alias for coordinator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the coordinator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Graph operation rejected
    #[error(transparent)]
    Task(#[from] TaskError),

    /// Persistence failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors raised by [`TaskManager`](crate::TaskManager) operations.
///
/// Every variant is raised before any state is touched, so a failed call
/// leaves the manager exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// A task with this id is already registered
    #[error("Task with id '{0}' already exists")]
    DuplicateTask(String),

    /// The referenced task id is unknown
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// The requested edge would close a dependency cycle
    #[error("Adding dependency {task_id} -> {depends_on} would create a cycle")]
    CircularDependency { task_id: String, depends_on: String },
}

impl TaskError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::DuplicateTask(_) => "duplicate_task",
            TaskError::TaskNotFound(_) => "task_not_found",
            TaskError::CircularDependency { .. } => "circular_dependency",
        }
    }

    /// Create a new not found error
    pub fn not_found(task_id: impl Into<String>) -> Self {
        Self::TaskNotFound(task_id.into())
    }
}

/// Persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored task set could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        "storage_error"
    }
}
