// Scenario and property tests for the task graph

use super::*;
use crate::error::TaskError;
use proptest::prelude::*;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};

const IDS: [&str; 6] = ["t0", "t1", "t2", "t3", "t4", "t5"];

fn seeded_manager() -> TaskManager {
    let mut manager = TaskManager::new();
    for id in IDS {
        manager.add_task(Task::new(id, format!("Task {id}"))).unwrap();
    }
    manager
}

#[derive(Debug, Clone)]
enum Op {
    Depend(usize, usize),
    Subtask(usize, usize),
    Complete(usize),
}

fn graph_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..IDS.len(), 0..IDS.len()).prop_map(|(a, b)| Op::Depend(a, b)),
        1 => (0..IDS.len()).prop_map(Op::Complete),
    ]
}

fn any_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..IDS.len(), 0..IDS.len()).prop_map(|(a, b)| Op::Depend(a, b)),
        1 => (0..IDS.len(), 0..IDS.len()).prop_map(|(a, b)| Op::Subtask(a, b)),
        1 => (0..IDS.len()).prop_map(Op::Complete),
    ]
}

fn apply(manager: &mut TaskManager, op: &Op) -> Result<(), TaskError> {
    match *op {
        Op::Depend(a, b) => manager.add_dependency(IDS[a], IDS[b]),
        Op::Subtask(a, b) => manager.add_subtask(IDS[a], IDS[b]),
        Op::Complete(a) => manager.mark_complete(IDS[a]).map(|_| ()),
    }
}

fn edge_set(manager: &TaskManager) -> BTreeMap<String, Vec<String>> {
    manager
        .tasks()
        .map(|t| (t.id.clone(), t.dependencies().iter().cloned().collect()))
        .collect()
}

fn has_cycle(manager: &TaskManager) -> bool {
    fn visit<'a>(
        manager: &'a TaskManager,
        id: &'a str,
        on_path: &mut HashSet<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> bool {
        if done.contains(id) {
            return false;
        }
        if !on_path.insert(id) {
            return true;
        }
        let task = manager.get_task(id).unwrap();
        let cyclic = task
            .dependencies()
            .iter()
            .any(|dep| visit(manager, dep, on_path, done));
        on_path.remove(id);
        done.insert(id);
        cyclic
    }

    let mut done = HashSet::new();
    manager
        .tasks()
        .any(|t| visit(manager, &t.id, &mut HashSet::new(), &mut done))
}

#[test]
fn scenario_dependency_unblocks_on_completion() {
    let mut manager = TaskManager::new();
    manager.add_task(Task::new("A", "Task A")).unwrap();
    manager.add_task(Task::new("B", "Task B")).unwrap();
    manager.add_dependency("B", "A").unwrap();

    assert_eq!(manager.task_status("A").unwrap(), TaskStatus::Ready);
    assert_eq!(manager.task_status("B").unwrap(), TaskStatus::Blocked);

    manager.mark_complete("A").unwrap();
    assert_eq!(manager.task_status("B").unwrap(), TaskStatus::Ready);
}

#[test]
fn scenario_cycle_rejected() {
    let mut manager = TaskManager::new();
    for id in ["A", "B", "C"] {
        manager.add_task(Task::new(id, id)).unwrap();
    }
    manager.add_dependency("B", "A").unwrap();
    manager.add_dependency("C", "B").unwrap();

    let err = manager.add_dependency("A", "C").unwrap_err();
    assert!(matches!(err, TaskError::CircularDependency { .. }));
    assert_eq!(err.code(), "circular_dependency");
}

#[test]
fn scenario_subtasks_complete_parent() {
    let mut manager = TaskManager::new();
    for id in ["P", "S1", "S2"] {
        manager.add_task(Task::new(id, id)).unwrap();
    }
    manager.add_subtask("P", "S1").unwrap();
    manager.add_subtask("P", "S2").unwrap();
    assert_eq!(manager.task_status("P").unwrap(), TaskStatus::Ready);

    manager.mark_complete("S1").unwrap();
    assert_ne!(manager.task_status("P").unwrap(), TaskStatus::Completed);

    manager.mark_complete("S2").unwrap();
    assert_eq!(manager.task_status("P").unwrap(), TaskStatus::Completed);
}

#[test]
fn scenario_persistence_roundtrip() {
    let storage = MemoryStorage::new();
    let mut manager = TaskManager::new();
    manager
        .add_task(Task::new("A", "Task A").with_metadata("priority", json!("high")))
        .unwrap();
    manager
        .add_task(Task::new("B", "Task B").with_agent_context("agent", json!({"id": 7})))
        .unwrap();
    manager.add_dependency("B", "A").unwrap();

    storage.save(&manager).unwrap();
    let loaded = storage.load().unwrap();

    for id in ["A", "B"] {
        let before = manager.get_task(id).unwrap();
        let after = loaded.get_task(id).unwrap();
        assert_eq!(after.dependencies(), before.dependencies());
        assert_eq!(after.dependents(), before.dependents());
        assert_eq!(after.metadata, before.metadata);
        assert_eq!(after.agent_context, before.agent_context);
        assert_eq!(after.status(), before.status());
    }
}

#[test]
fn scenario_unknown_status_lookup() {
    let manager = TaskManager::new();
    assert_eq!(
        manager.task_status("nope"),
        Err(TaskError::TaskNotFound("nope".to_string()))
    );
}

proptest! {
    #[test]
    fn prop_graph_stays_acyclic(ops in prop::collection::vec(any_op(), 0..40)) {
        let mut manager = seeded_manager();

        for op in &ops {
            let before = edge_set(&manager);
            match apply(&mut manager, op) {
                Err(TaskError::CircularDependency { .. }) => {
                    prop_assert_eq!(edge_set(&manager), before);
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
                Ok(()) => {}
            }
            prop_assert!(!has_cycle(&manager));
        }
    }

    #[test]
    fn prop_edges_are_mutual_inverses(ops in prop::collection::vec(any_op(), 0..40)) {
        let mut manager = seeded_manager();
        for op in &ops {
            let _ = apply(&mut manager, op);
        }

        for task in manager.tasks() {
            for dep in task.dependencies() {
                prop_assert!(manager.get_task(dep).unwrap().dependents().contains(&task.id));
            }
            for dependent in task.dependents() {
                prop_assert!(manager.get_task(dependent).unwrap().dependencies().contains(&task.id));
            }
        }
    }

    #[test]
    fn prop_status_matches_dependencies(ops in prop::collection::vec(graph_op(), 0..40)) {
        let mut manager = seeded_manager();
        for op in &ops {
            let _ = apply(&mut manager, op);
        }

        for task in manager.tasks() {
            if task.is_completed() {
                continue;
            }
            let unmet = manager.get_unmet_dependencies(&task.id).unwrap();
            let expected = if unmet.is_empty() { TaskStatus::Ready } else { TaskStatus::Blocked };
            prop_assert_eq!(task.status(), expected, "task {}", task.id);
        }
    }

    #[test]
    fn prop_completion_is_monotonic(ops in prop::collection::vec(any_op(), 0..40)) {
        let mut manager = seeded_manager();
        let mut completed: HashSet<String> = HashSet::new();

        for op in &ops {
            let _ = apply(&mut manager, op);
            for id in &completed {
                prop_assert_eq!(manager.task_status(id).unwrap(), TaskStatus::Completed);
            }
            completed.extend(manager.tasks().filter(|t| t.is_completed()).map(|t| t.id.clone()));
        }
    }

    #[test]
    fn prop_topological_order_respects_dependencies(ops in prop::collection::vec(graph_op(), 0..40)) {
        let mut manager = seeded_manager();
        for op in &ops {
            let _ = apply(&mut manager, op);
        }

        let order: Vec<&str> = manager.topological_order().iter().map(|t| t.id.as_str()).collect();
        prop_assert_eq!(order.len(), manager.len());

        let position = |id: &str| order.iter().position(|o| *o == id);
        for task in manager.tasks() {
            for dep in task.dependencies() {
                prop_assert!(position(dep) < position(&task.id));
            }
        }
    }
}
