//! Core data types for the scheduling system.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::critical_path::TaskTiming;

/// A task as it comes out of the task store.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
    /// Ids of tasks that must finish before this one can begin.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            dependencies: Vec::new(),
        }
    }

    /// Add a blocking task.
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }
}

/// A task normalized for one scheduling run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskNode {
    pub id: String,
    pub start: DateTime<Utc>,
    /// Never before `start`.
    pub end: DateTime<Utc>,
    pub duration: Duration,
    /// Declared dependency ids, de-duplicated. May name tasks that are not in
    /// the snapshot; only present ones become graph edges.
    pub dependencies: Vec<String>,
}

impl TaskNode {
    pub fn from_record(record: &TaskRecord) -> Self {
        // A negative-duration task collapses to a zero-duration one
        let end = record.end.max(record.start);
        let mut dependencies: Vec<String> = Vec::with_capacity(record.dependencies.len());
        for dep in &record.dependencies {
            if !dependencies.contains(dep) {
                dependencies.push(dep.clone());
            }
        }
        Self {
            id: record.id.clone(),
            start: record.start,
            end,
            duration: end - record.start,
            dependencies,
        }
    }
}

/// A task annotated with the outcome of a scheduling run.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledTask {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration: Duration,
    /// `None` when the task never became ready (it sits on or behind a cycle).
    pub timing: Option<TaskTiming>,
    pub is_critical: bool,
}

/// Outcome of scheduling a whole snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schedule {
    /// One entry per input record, in input order.
    pub tasks: Vec<ScheduledTask>,
    /// Minimum earliest start over scheduled tasks.
    pub project_start: Option<DateTime<Utc>>,
    /// Maximum earliest finish over scheduled tasks.
    pub project_end: Option<DateTime<Utc>>,
    /// Critical task ids ordered by earliest start.
    pub critical_path: Vec<String>,
    /// Ids of tasks without a computed schedule.
    pub unscheduled: Vec<String>,
}

impl Schedule {
    pub fn task(&self, id: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_negative_duration_is_normalized() {
        let node = TaskNode::from_record(&TaskRecord::new("a", day(3), day(1)));
        assert_eq!(node.end, day(3));
        assert_eq!(node.duration, Duration::zero());
    }

    #[test]
    fn test_duplicate_dependencies_collapse() {
        let record = TaskRecord::new("c", day(0), day(2))
            .depends_on("a")
            .depends_on("b")
            .depends_on("a");
        let node = TaskNode::from_record(&record);
        assert_eq!(node.dependencies, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(node.duration, Duration::days(2));
    }

    #[test]
    fn test_record_from_store_json() {
        let record: TaskRecord =
            serde_json::from_str(r#"{"id": "a", "start": 0, "end": 86400000}"#).unwrap();
        assert_eq!(record.id, "a");
        assert_eq!(record.end - record.start, Duration::days(1));
        assert!(record.dependencies.is_empty());
    }
}
