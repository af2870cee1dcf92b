//! Critical path scheduling for the Gantt view of Activity Notes.
//!
//! Takes a snapshot of tasks (start, end, blocking tasks), builds the
//! dependency graph and annotates every task with its earliest and latest
//! start and finish, slack and criticality. Pure and synchronous: every call
//! works on the snapshot it is given and nothing is cached between calls.

// Allow clippy warning triggered by PyO3 macro expansion
#![cfg_attr(feature = "python", allow(clippy::useless_conversion))]

pub mod config;
pub mod critical_path;
pub mod graph;
pub mod interner;
pub mod logging;
pub mod models;
#[cfg(feature = "python")]
mod python;
pub mod snapshot;

pub use config::{ConfigError, CyclePolicy, SchedulerConfig};
pub use critical_path::{calculate_critical_path, CriticalPathResult, ScheduleError, TaskTiming};
pub use graph::{GraphError, TaskGraph};
pub use models::{Schedule, ScheduledTask, TaskNode, TaskRecord};
pub use snapshot::{parse_tasks, read_tasks, schedule_json, SnapshotError};

/// Build the dependency graph for `tasks` and run the critical path passes.
///
/// # Errors
/// * `ScheduleError::InvalidInput` for an empty or duplicate task id
/// * `ScheduleError::CircularDependency` for a cyclic graph under `CyclePolicy::Reject`
/// * `ScheduleError::InvalidConfig` for a non-positive critical epsilon
/// * `ScheduleError::TimeOutOfRange` when a computed instant leaves chrono's range
pub fn schedule_tasks(
    tasks: &[TaskRecord],
    config: &SchedulerConfig,
) -> Result<Schedule, ScheduleError> {
    let graph = TaskGraph::build_with_verbosity(tasks, config.verbosity)?;
    crate::log_changes!(
        config.verbosity,
        "Built task graph: {} task(s), {} dangling dependency reference(s) dropped",
        graph.len(),
        graph.dropped_dependencies()
    );
    let result = calculate_critical_path(&graph, config)?;
    Ok(annotate(&graph, result))
}

/// Attach a run's timings to the graph's nodes, in input order.
pub fn annotate(graph: &TaskGraph, mut result: CriticalPathResult) -> Schedule {
    let critical_path = result
        .critical_path()
        .into_iter()
        .map(str::to_string)
        .collect();

    let tasks = graph
        .nodes()
        .iter()
        .map(|node| {
            let timing = result.task_timings.remove(&node.id);
            ScheduledTask {
                id: node.id.clone(),
                start: node.start,
                end: node.end,
                duration: node.duration,
                is_critical: timing.is_some() && result.critical_path_tasks.contains(&node.id),
                timing,
            }
        })
        .collect();

    Schedule {
        tasks,
        project_start: result.project_start,
        project_end: result.project_end,
        critical_path,
        unscheduled: result.unscheduled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_schedule_preserves_input_order() {
        let tasks = vec![
            TaskRecord::new("b", day(1), day(3)).depends_on("a"),
            TaskRecord::new("a", day(0), day(2)),
            TaskRecord::new("orphan", day(0), day(1)).depends_on("gone"),
        ];
        let schedule = schedule_tasks(&tasks, &SchedulerConfig::default()).unwrap();

        let ids: Vec<&str> = schedule.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "orphan"]);
        assert_eq!(schedule.project_end, Some(day(4)));
        assert_eq!(schedule.critical_path, vec!["a", "b"]);

        let orphan = schedule.task("orphan").unwrap();
        assert_eq!(orphan.timing.as_ref().unwrap().earliest_start, day(0));
        assert!(!orphan.is_critical);
    }

    #[test]
    fn test_cycle_leaves_tasks_unannotated() {
        let tasks = vec![
            TaskRecord::new("a", day(0), day(1)).depends_on("b"),
            TaskRecord::new("b", day(0), day(1)).depends_on("a"),
            TaskRecord::new("c", day(0), day(2)),
        ];
        let schedule = schedule_tasks(&tasks, &SchedulerConfig::default()).unwrap();

        assert_eq!(schedule.unscheduled, vec!["a", "b"]);
        let a = schedule.task("a").unwrap();
        assert!(a.timing.is_none());
        assert!(!a.is_critical);
        assert!(schedule.task("c").unwrap().is_critical);
    }

    #[test]
    fn test_invalid_snapshot_rejected() {
        let tasks = vec![
            TaskRecord::new("a", day(0), day(1)),
            TaskRecord::new("a", day(1), day(2)),
        ];
        let err = schedule_tasks(&tasks, &SchedulerConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::InvalidInput(GraphError::DuplicateTaskId("a".to_string()))
        );
    }
}
