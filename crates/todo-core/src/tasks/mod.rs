//! Task graph: types, the dependency-aware manager and persistence.

pub mod manager;
pub mod storage;
pub mod types;

#[cfg(test)]
mod tests;

pub use manager::TaskManager;
pub use storage::{FileStorage, MemoryStorage, TaskStorage, DEFAULT_STORE_PATH};
pub use types::{Completion, Metadata, Task, TaskStatus};
