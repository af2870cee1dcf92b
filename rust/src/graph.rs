//! Task dependency graph construction.
//!
//! Turns a flat snapshot of `TaskRecord`s into normalized `TaskNode`s with
//! predecessor and successor adjacency indexed by `NodeId`.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::interner::{NodeId, NodeIndex};
use crate::log_checks;
use crate::models::{TaskNode, TaskRecord};

/// Records rejected at the graph boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Task at position {index} has an empty id")]
    EmptyTaskId { index: usize },
    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),
}

/// Dependency graph over one snapshot of tasks.
///
/// Every node has an entry in both adjacency lists, possibly empty.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    index: NodeIndex,
    nodes: Vec<TaskNode>,
    predecessors: Vec<Vec<NodeId>>,
    successors: Vec<Vec<NodeId>>,
    dropped_dependencies: usize,
}

impl TaskGraph {
    /// Build the graph, dropping dependencies on tasks absent from `tasks`.
    pub fn build(tasks: &[TaskRecord]) -> Result<Self, GraphError> {
        Self::build_with_verbosity(tasks, 0)
    }

    pub(crate) fn build_with_verbosity(
        tasks: &[TaskRecord],
        verbosity: u8,
    ) -> Result<Self, GraphError> {
        let mut index = NodeIndex::with_capacity(tasks.len());
        let mut nodes = Vec::with_capacity(tasks.len());

        for (position, record) in tasks.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(GraphError::EmptyTaskId { index: position });
            }
            index.insert(&record.id)?;
            nodes.push(TaskNode::from_record(record));
        }

        let n = nodes.len();
        let mut predecessors: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut dropped_dependencies = 0;

        for (idx, node) in nodes.iter().enumerate() {
            let id = idx as NodeId;
            for dep in &node.dependencies {
                match index.get(dep) {
                    Some(dep_id) => {
                        predecessors[idx].push(dep_id);
                        successors[dep_id as usize].push(id);
                    }
                    None => {
                        dropped_dependencies += 1;
                        log_checks!(
                            verbosity,
                            "Dropping dependency of {} on unknown task {}",
                            node.id,
                            dep
                        );
                    }
                }
            }
        }

        Ok(Self {
            index,
            nodes,
            predecessors,
            successors,
            dropped_dependencies,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, task_id: &str) -> Option<&TaskNode> {
        self.index.get(task_id).map(|id| &self.nodes[id as usize])
    }

    /// Nodes in input order.
    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    /// Honored dependencies of `task_id`; empty for unknown ids.
    pub fn predecessors(&self, task_id: &str) -> Vec<&str> {
        self.index
            .get(task_id)
            .map(|id| self.resolve_all(&self.predecessors[id as usize]))
            .unwrap_or_default()
    }

    /// Tasks that wait on `task_id`; empty for unknown ids.
    pub fn successors(&self, task_id: &str) -> Vec<&str> {
        self.index
            .get(task_id)
            .map(|id| self.resolve_all(&self.successors[id as usize]))
            .unwrap_or_default()
    }

    pub fn predecessors_map(&self) -> FxHashMap<&str, Vec<&str>> {
        self.adjacency_map(&self.predecessors)
    }

    pub fn successors_map(&self) -> FxHashMap<&str, Vec<&str>> {
        self.adjacency_map(&self.successors)
    }

    /// Number of dependency references that named no task in the snapshot.
    pub fn dropped_dependencies(&self) -> usize {
        self.dropped_dependencies
    }

    pub(crate) fn node_at(&self, id: NodeId) -> &TaskNode {
        &self.nodes[id as usize]
    }

    pub(crate) fn predecessor_ids(&self, id: NodeId) -> &[NodeId] {
        &self.predecessors[id as usize]
    }

    pub(crate) fn successor_ids(&self, id: NodeId) -> &[NodeId] {
        &self.successors[id as usize]
    }

    fn resolve_all(&self, ids: &[NodeId]) -> Vec<&str> {
        ids.iter().filter_map(|&id| self.index.resolve(id)).collect()
    }

    fn adjacency_map(&self, adjacency: &[Vec<NodeId>]) -> FxHashMap<&str, Vec<&str>> {
        self.nodes
            .iter()
            .zip(adjacency)
            .map(|(node, ids)| (node.id.as_str(), self.resolve_all(ids)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn make_task(id: &str, start: i64, end: i64, deps: &[&str]) -> TaskRecord {
        deps.iter().fold(TaskRecord::new(id, day(start), day(end)), |task, dep| {
            task.depends_on(*dep)
        })
    }

    #[test]
    fn test_adjacency_both_directions() {
        let graph = TaskGraph::build(&[
            make_task("a", 0, 2, &[]),
            make_task("b", 0, 3, &["a"]),
            make_task("c", 0, 1, &["a", "b"]),
        ])
        .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.predecessors("c"), vec!["a", "b"]);
        assert_eq!(graph.successors("a"), vec!["b", "c"]);
        assert_eq!(graph.successors("c"), Vec::<&str>::new());
        assert_eq!(graph.predecessors("a"), Vec::<&str>::new());
    }

    #[test]
    fn test_every_node_has_map_entries() {
        let graph = TaskGraph::build(&[
            make_task("a", 0, 1, &[]),
            make_task("b", 0, 1, &[]),
            make_task("c", 0, 1, &["b"]),
        ])
        .unwrap();

        let preds = graph.predecessors_map();
        let succs = graph.successors_map();
        for node in graph.nodes() {
            assert!(preds.contains_key(node.id.as_str()));
            assert!(succs.contains_key(node.id.as_str()));
        }
        assert!(succs["a"].is_empty());
        assert_eq!(succs["b"], vec!["c"]);
    }

    #[test]
    fn test_dangling_dependency_dropped() {
        let graph = TaskGraph::build(&[
            make_task("a", 0, 1, &["deleted"]),
            make_task("b", 0, 1, &["a", "ghost"]),
        ])
        .unwrap();

        assert_eq!(graph.dropped_dependencies(), 2);
        assert!(graph.predecessors("a").is_empty());
        assert_eq!(graph.predecessors("b"), vec!["a"]);
        // The declared list is kept on the node itself
        assert_eq!(graph.node("a").unwrap().dependencies, vec!["deleted"]);
    }

    #[test]
    fn test_end_before_start_normalized() {
        let graph = TaskGraph::build(&[make_task("a", 4, 2, &[])]).unwrap();
        let node = graph.node("a").unwrap();
        assert_eq!(node.end, day(4));
        assert_eq!(node.duration, Duration::zero());
    }

    #[test]
    fn test_invalid_ids_rejected() {
        let duplicate = TaskGraph::build(&[make_task("a", 0, 1, &[]), make_task("a", 1, 2, &[])]);
        assert_eq!(
            duplicate.unwrap_err(),
            GraphError::DuplicateTaskId("a".to_string())
        );

        let empty = TaskGraph::build(&[make_task("a", 0, 1, &[]), make_task("  ", 0, 1, &[])]);
        assert_eq!(empty.unwrap_err(), GraphError::EmptyTaskId { index: 1 });
    }

    #[test]
    fn test_empty_snapshot() {
        let graph = TaskGraph::build(&[]).unwrap();
        assert!(graph.is_empty());
        assert!(graph.node("a").is_none());
        assert!(graph.successors_map().is_empty());
    }
}
