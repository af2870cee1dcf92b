//! Dense integer ids for task ids.
//!
//! Both scheduling passes index plain vectors by `NodeId` instead of hashing
//! strings on every edge.

use rustc_hash::FxHashMap;

use crate::graph::GraphError;

/// Position of a task in a `TaskGraph` (u32 for compact adjacency lists).
pub type NodeId = u32;

/// Bidirectional map between task id strings and `NodeId`s.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    to_id: FxHashMap<String, NodeId>,
    from_id: Vec<String>,
}

impl NodeIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_id: Vec::with_capacity(capacity),
        }
    }

    /// Register a task id, returning the next dense id.
    ///
    /// Task ids must be unique within a snapshot, so a second insert of the
    /// same string is an error rather than a lookup.
    pub fn insert(&mut self, task_id: &str) -> Result<NodeId, GraphError> {
        if self.to_id.contains_key(task_id) {
            return Err(GraphError::DuplicateTaskId(task_id.to_string()));
        }
        let id = self.from_id.len() as NodeId;
        self.from_id.push(task_id.to_string());
        self.to_id.insert(task_id.to_string(), id);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, task_id: &str) -> Option<NodeId> {
        self.to_id.get(task_id).copied()
    }

    #[inline]
    pub fn resolve(&self, id: NodeId) -> Option<&str> {
        self.from_id.get(id as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.from_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.from_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_resolve() {
        let mut index = NodeIndex::with_capacity(2);
        let a = index.insert("task_a").unwrap();
        let b = index.insert("task_b").unwrap();

        assert_eq!((a, b), (0, 1));
        assert_eq!(index.resolve(a), Some("task_a"));
        assert_eq!(index.get("task_b"), Some(b));
        assert_eq!(index.get("missing"), None);
        assert_eq!(index.resolve(7), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut index = NodeIndex::default();
        index.insert("a").unwrap();
        assert_eq!(
            index.insert("a"),
            Err(GraphError::DuplicateTaskId("a".to_string()))
        );
        assert_eq!(index.len(), 1);
    }
}
