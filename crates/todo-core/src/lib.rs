//! Task dependency coordinator core.
//!
//! Tracks tasks, their dependency edges and parent/subtask hierarchy, and
//! derives each task's readiness after every mutation.
//!
//! ```
//! use todo_core::{Task, TaskManager, TaskStatus};
//!
//! let mut manager = TaskManager::new();
//! manager.add_task(Task::new("a", "Write parser")).unwrap();
//! manager.add_task(Task::new("b", "Ship release")).unwrap();
//! manager.add_dependency("b", "a").unwrap();
//!
//! assert_eq!(manager.task_status("b").unwrap(), TaskStatus::Blocked);
//! manager.mark_complete("a").unwrap();
//! assert_eq!(manager.task_status("b").unwrap(), TaskStatus::Ready);
//! ```

pub mod error;
pub mod tasks;

pub use error::{Error, Result, StorageError, TaskError};
pub use tasks::{
    Completion, FileStorage, MemoryStorage, Metadata, Task, TaskManager, TaskStatus, TaskStorage,
};
