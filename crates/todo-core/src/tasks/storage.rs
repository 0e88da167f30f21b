// JSON persistence for the task graph

use super::manager::TaskManager;
use super::types::Task;
use crate::error::StorageError;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, StorageError>;

/// Default store location, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = ".todo-mcp/tasks.json";

/// Whole-graph persistence.
///
/// Every load returns a fresh manager and every save replaces what was
/// stored before. There is no partial update.
pub trait TaskStorage: Send + Sync {
    /// Load all tasks; an absent store yields an empty manager
    fn load(&self) -> Result<TaskManager>;

    /// Persist all tasks, replacing previous contents
    fn save(&self, manager: &TaskManager) -> Result<()>;
}

/// Tasks stored as one JSON object keyed by task id.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_STORE_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileStorage {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl TaskStorage for FileStorage {
    fn load(&self) -> Result<TaskManager> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No task store yet, starting empty");
            return Ok(TaskManager::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let manager = decode(&content)?;

        debug!(path = %self.path.display(), tasks = manager.len(), "Loaded tasks");
        Ok(manager)
    }

    fn save(&self, manager: &TaskManager) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let content = encode(manager)?;

        // Write next to the target, then rename over it
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, content).map_err(|e| StorageError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StorageError::io(&self.path, e))?;

        info!(path = %self.path.display(), tasks = manager.len(), "Saved tasks");
        Ok(())
    }
}

/// In-process store holding the serialized document.
///
/// Goes through the same encoding as [`FileStorage`], so loads never share
/// state with the manager that was saved.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON document from the last save, if any
    pub fn snapshot(&self) -> Option<String> {
        self.document.lock().clone()
    }
}

impl TaskStorage for MemoryStorage {
    fn load(&self) -> Result<TaskManager> {
        match self.document.lock().as_deref() {
            Some(content) => decode(content),
            None => Ok(TaskManager::new()),
        }
    }

    fn save(&self, manager: &TaskManager) -> Result<()> {
        let content = encode(manager)?;
        *self.document.lock() = Some(content);
        Ok(())
    }
}

fn encode(manager: &TaskManager) -> Result<String> {
    let records: BTreeMap<&str, &Task> = manager.tasks().map(|t| (t.id.as_str(), t)).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

fn decode(content: &str) -> Result<TaskManager> {
    if content.trim().is_empty() {
        return Ok(TaskManager::new());
    }

    let records: BTreeMap<String, Task> = serde_json::from_str(content)?;
    // The map key is the task's identity; the inner id only mirrors it.
    let tasks = records.into_iter().map(|(key, mut task)| {
        if !task.id.is_empty() && task.id != key {
            warn!(key = %key, id = %task.id, "Stored task id differs from its key, using the key");
        }
        task.id = key;
        task
    });

    Ok(TaskManager::from_tasks(tasks))
}
