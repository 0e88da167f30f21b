// Core types for the task graph

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Opaque key/value annotations carried verbatim on a task.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Execution readiness of a task.
///
/// PENDING only exists between construction and the first recompute;
/// COMPLETED is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Created, not yet evaluated
    #[default]
    Pending,
    /// All dependencies completed
    Ready,
    /// At least one dependency incomplete
    Blocked,
    /// Being worked on (caller-side state, never set by the manager)
    InProgress,
    /// Finished
    Completed,
}

impl TaskStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Upper-case name as used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Ready => "READY",
            TaskStatus::Blocked => "BLOCKED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of trackable work.
///
/// `id`, `title`, `metadata` and `agent_context` belong to the caller. Status
/// and relationship edges are owned by [`TaskManager`](super::TaskManager)
/// and are read-only from the outside so the inverse edges stay in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    #[serde(default)]
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub(crate) status: TaskStatus,

    /// Tasks that must be completed before this one is ready
    #[serde(default)]
    pub(crate) dependencies: BTreeSet<String>,

    /// Tasks that list this one as a dependency
    #[serde(default)]
    pub(crate) dependents: BTreeSet<String>,

    #[serde(default)]
    pub(crate) parent: Option<String>,

    #[serde(default)]
    pub(crate) subtasks: BTreeSet<String>,

    /// Caller annotations, never inspected
    #[serde(default)]
    pub metadata: Metadata,

    /// Caller-side bookkeeping, never inspected
    #[serde(default)]
    pub agent_context: Metadata,
}

impl Task {
    /// Create a new task with empty relationships.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::Pending,
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            parent: None,
            subtasks: BTreeSet::new(),
            metadata: Metadata::new(),
            agent_context: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_agent_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.agent_context.insert(key.into(), value);
        self
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    pub fn dependents(&self) -> &BTreeSet<String> {
        &self.dependents
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn subtasks(&self) -> &BTreeSet<String> {
        &self.subtasks
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

/// Effects of a [`mark_complete`](super::TaskManager::mark_complete) call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// Dependents that moved from BLOCKED to READY
    pub unblocked: Vec<String>,
    /// Parent completed because its last subtask finished
    pub parent_completed: Option<String>,
}
