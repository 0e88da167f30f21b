// Task Manager - dependency graph and status propagation

use super::types::{Completion, Task, TaskStatus};
use crate::error::TaskError;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, TaskError>;

/// Owns every task and keeps statuses consistent with the dependency graph.
///
/// All mutations are validated before anything is written, so a failed call
/// leaves the graph untouched. The manager is single-owner: callers that
/// share one across tasks must serialize access themselves.
#[derive(Debug, Clone, Default)]
pub struct TaskManager {
    tasks: BTreeMap<String, Task>,
}

impl TaskManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager from already-formed tasks.
    ///
    /// Statuses and edges are trusted as given; nothing is recomputed until
    /// the next mutation touches a task.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// Insert a new task and resolve its initial status
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            return Err(TaskError::DuplicateTask(task.id));
        }

        let task_id = task.id.clone();
        self.tasks.insert(task_id.clone(), task);
        let status = self.update_status(&task_id).map(|(_, next)| next);

        debug!(task_id = %task_id, status = ?status, "Task added");
        Ok(())
    }

    /// Declare that `task_id` requires `depends_on` to be completed first.
    ///
    /// Fails with `CircularDependency` when `task_id` is already reachable
    /// from `depends_on`; a task depending on itself is the trivial case.
    pub fn add_dependency(&mut self, task_id: &str, depends_on: &str) -> Result<()> {
        self.get_task(task_id)?;
        self.get_task(depends_on)?;

        if self.would_create_cycle(task_id, depends_on) {
            return Err(TaskError::CircularDependency {
                task_id: task_id.to_string(),
                depends_on: depends_on.to_string(),
            });
        }

        if let Some(task) = self.tasks.get_mut(task_id) {
            task.dependencies.insert(depends_on.to_string());
        }
        if let Some(other) = self.tasks.get_mut(depends_on) {
            other.dependents.insert(task_id.to_string());
        }
        let status = self.update_status(task_id).map(|(_, next)| next);

        debug!(task_id, depends_on, status = ?status, "Dependency added");
        Ok(())
    }

    /// Make `subtask_id` a child of `parent_id`.
    ///
    /// No cycle check is done on the hierarchy, and a previous parent keeps
    /// the child in its subtask set.
    pub fn add_subtask(&mut self, parent_id: &str, subtask_id: &str) -> Result<()> {
        self.get_task(parent_id)?;
        self.get_task(subtask_id)?;

        if let Some(parent) = self.tasks.get_mut(parent_id) {
            parent.subtasks.insert(subtask_id.to_string());
        }
        if let Some(sub) = self.tasks.get_mut(subtask_id) {
            sub.parent = Some(parent_id.to_string());
        }
        self.update_status(parent_id);

        debug!(parent_id, subtask_id, "Subtask added");
        Ok(())
    }

    /// Mark a task completed and propagate one level.
    ///
    /// Every direct dependent is recomputed, and the parent is completed when
    /// all of its subtasks are. Neither effect cascades further.
    pub fn mark_complete(&mut self, task_id: &str) -> Result<Completion> {
        let task = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| TaskError::not_found(task_id))?;

        task.status = TaskStatus::Completed;
        let dependents: Vec<String> = task.dependents.iter().cloned().collect();
        let parent = task.parent.clone();

        let mut completion = Completion::default();

        for dependent in dependents {
            match self.update_status(&dependent) {
                Some((TaskStatus::Blocked, TaskStatus::Ready)) => completion.unblocked.push(dependent),
                Some(_) => {}
                None => warn!(task_id, dependent = %dependent, "Skipping unknown dependent"),
            }
        }

        if let Some(parent_id) = parent {
            match self.tasks.get(&parent_id) {
                Some(parent) => {
                    let finished = !parent.is_completed() && self.all_subtasks_completed(parent);
                    if finished {
                        if let Some(parent) = self.tasks.get_mut(&parent_id) {
                            parent.status = TaskStatus::Completed;
                        }
                        completion.parent_completed = Some(parent_id);
                    }
                }
                None => warn!(task_id, parent_id = %parent_id, "Skipping unknown parent"),
            }
        }

        info!(
            task_id,
            unblocked = completion.unblocked.len(),
            parent_completed = ?completion.parent_completed,
            "Task completed"
        );
        Ok(completion)
    }

    /// Get a task by ID
    pub fn get_task(&self, task_id: &str) -> Result<&Task> {
        self.tasks
            .get(task_id)
            .ok_or_else(|| TaskError::not_found(task_id))
    }

    pub fn task_status(&self, task_id: &str) -> Result<TaskStatus> {
        self.get_task(task_id).map(Task::status)
    }

    /// All tasks currently READY. Order is not significant.
    pub fn get_ready_tasks(&self) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|t| t.status == TaskStatus::Ready)
            .collect()
    }

    /// Get all tasks that this task depends on
    pub fn get_dependencies(&self, task_id: &str) -> Result<Vec<&Task>> {
        let task = self.get_task(task_id)?;
        Ok(self.resolve(&task.dependencies))
    }

    /// Get all tasks that depend on this task
    pub fn get_dependents(&self, task_id: &str) -> Result<Vec<&Task>> {
        let task = self.get_task(task_id)?;
        Ok(self.resolve(&task.dependents))
    }

    pub fn get_subtasks(&self, task_id: &str) -> Result<Vec<&Task>> {
        let task = self.get_task(task_id)?;
        Ok(self.resolve(&task.subtasks))
    }

    /// Ids of dependencies that are not completed yet.
    ///
    /// A dependency id with no matching task counts as unmet.
    pub fn get_unmet_dependencies(&self, task_id: &str) -> Result<Vec<String>> {
        let task = self.get_task(task_id)?;
        Ok(task
            .dependencies
            .iter()
            .filter(|dep| !self.is_completed(dep))
            .cloned()
            .collect())
    }

    /// Every task, each one after all of its dependencies.
    ///
    /// Kahn's algorithm with ties broken by id. Should loaded data contain a
    /// cycle, the tasks on it are appended in id order.
    pub fn topological_order(&self) -> Vec<&Task> {
        let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(self.tasks.len());
        let mut adj_list: HashMap<&str, Vec<&str>> = HashMap::new();

        for (task_id, task) in &self.tasks {
            in_degree.entry(task_id.as_str()).or_insert(0);

            for dep_id in task.dependencies.iter().filter(|d| self.tasks.contains_key(*d)) {
                adj_list.entry(dep_id.as_str()).or_default().push(task_id.as_str());
                *in_degree.entry(task_id.as_str()).or_insert(0) += 1;
            }
        }

        let mut queue: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut result = Vec::with_capacity(self.tasks.len());
        let mut placed: HashSet<&str> = HashSet::with_capacity(self.tasks.len());

        while let Some(task_id) = queue.pop_first() {
            let Some(task) = self.tasks.get(task_id) else {
                continue;
            };
            result.push(task);
            placed.insert(task_id);

            if let Some(neighbors) = adj_list.get(task_id) {
                for neighbor in neighbors {
                    if let Some(deg) = in_degree.get_mut(neighbor) {
                        *deg -= 1;
                        if *deg == 0 {
                            queue.insert(*neighbor);
                        }
                    }
                }
            }
        }

        if result.len() != self.tasks.len() {
            warn!(
                remaining = self.tasks.len() - result.len(),
                "Cycle detected in stored task dependencies"
            );
            result.extend(
                self.tasks
                    .values()
                    .filter(|t| !placed.contains(t.id.as_str())),
            );
        }

        result
    }

    /// Iterate over all tasks
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.contains_key(task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Recompute a task's readiness from its dependencies.
    ///
    /// Returns `(previous, current)`, or `None` for an unknown id. COMPLETED
    /// is never overwritten.
    fn update_status(&mut self, task_id: &str) -> Option<(TaskStatus, TaskStatus)> {
        let task = self.tasks.get(task_id)?;
        let previous = task.status;
        if previous.is_completed() {
            return Some((previous, previous));
        }

        let next = if task.dependencies.iter().any(|dep| !self.is_completed(dep)) {
            TaskStatus::Blocked
        } else {
            TaskStatus::Ready
        };

        if let Some(task) = self.tasks.get_mut(task_id) {
            task.status = next;
        }
        Some((previous, next))
    }

    fn is_completed(&self, task_id: &str) -> bool {
        self.tasks.get(task_id).is_some_and(Task::is_completed)
    }

    fn all_subtasks_completed(&self, parent: &Task) -> bool {
        parent.subtasks.iter().all(|sub| self.is_completed(sub))
    }

    fn resolve(&self, ids: &BTreeSet<String>) -> Vec<&Task> {
        ids.iter().filter_map(|id| self.tasks.get(id)).collect()
    }

    /// Would adding `task_id -> depends_on` close a cycle?
    ///
    /// Depth-first walk from `depends_on` along stored dependency edges,
    /// looking for `task_id`.
    fn would_create_cycle<'a>(&'a self, task_id: &str, depends_on: &'a str) -> bool {
        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut stack = vec![depends_on];

        while let Some(current) = stack.pop() {
            if current == task_id {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(task) = self.tasks.get(current) {
                stack.extend(task.dependencies.iter().map(String::as_str));
            }
        }

        false
    }
}
