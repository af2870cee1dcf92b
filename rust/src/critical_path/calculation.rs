//! Critical path calculation using forward and backward passes.

use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use thiserror::Error;

use crate::config::{ConfigError, CyclePolicy, SchedulerConfig};
use crate::graph::{GraphError, TaskGraph};
use crate::interner::NodeId;
use crate::{log_changes, log_checks, log_debug};

use super::types::TaskTiming;

/// Errors that can occur while scheduling a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid task snapshot: {0}")]
    InvalidInput(#[from] GraphError),
    #[error("Circular dependency detected between tasks: {}", .task_ids.join(", "))]
    CircularDependency { task_ids: Vec<String> },
    #[error("Invalid scheduler config: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("Schedule of task {task_id} falls outside the representable time range")]
    TimeOutOfRange { task_id: String },
}

/// Result of one critical path run over a whole graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriticalPathResult {
    /// Timings for every task that left the forward-pass queue.
    pub task_timings: FxHashMap<String, TaskTiming>,
    /// Ids of tasks with zero slack.
    pub critical_path_tasks: FxHashSet<String>,
    /// Topological order in which the forward pass dequeued tasks.
    pub processed_order: Vec<String>,
    /// Tasks that never became ready, in input order. Their schedule is undefined.
    pub unscheduled: Vec<String>,
    /// Minimum earliest start, `None` when nothing was scheduled.
    pub project_start: Option<DateTime<Utc>>,
    /// Maximum earliest finish, `None` when nothing was scheduled.
    pub project_end: Option<DateTime<Utc>>,
}

impl CriticalPathResult {
    pub fn timing(&self, task_id: &str) -> Option<&TaskTiming> {
        self.task_timings.get(task_id)
    }

    pub fn is_critical(&self, task_id: &str) -> bool {
        self.critical_path_tasks.contains(task_id)
    }

    /// Critical task ids ordered by earliest start, ties in topological order.
    pub fn critical_path(&self) -> Vec<&str> {
        let mut path: Vec<(&str, DateTime<Utc>)> = self
            .processed_order
            .iter()
            .filter(|id| self.critical_path_tasks.contains(id.as_str()))
            .filter_map(|id| {
                self.task_timings
                    .get(id)
                    .map(|timing| (id.as_str(), timing.earliest_start))
            })
            .collect();
        // Stable sort keeps topological order among equal starts
        path.sort_by_key(|&(_, earliest_start)| earliest_start);
        path.into_iter().map(|(id, _)| id).collect()
    }
}

/// Compute earliest/latest times, slack and criticality for every task.
///
/// Tasks that sit on a cycle, or behind one, never reach in-degree zero. With
/// `CyclePolicy::Degrade` they are reported in `unscheduled` and get no
/// timing; with `CyclePolicy::Reject` the run fails instead.
///
/// # Errors
/// * `ScheduleError::InvalidConfig` for a non-positive critical epsilon
/// * `ScheduleError::CircularDependency` for a cycle under `CyclePolicy::Reject`
/// * `ScheduleError::TimeOutOfRange` when a computed instant leaves chrono's range
pub fn calculate_critical_path(
    graph: &TaskGraph,
    config: &SchedulerConfig,
) -> Result<CriticalPathResult, ScheduleError> {
    config.validate()?;
    let verbosity = config.verbosity;
    let n = graph.len();

    // Forward pass: earliest start/finish in Kahn's order
    let mut in_degree: Vec<usize> = (0..n)
        .map(|idx| graph.predecessor_ids(idx as NodeId).len())
        .collect();
    let mut earliest_start: Vec<Option<DateTime<Utc>>> = vec![None; n];
    let mut queue: VecDeque<NodeId> = VecDeque::with_capacity(n);

    for idx in 0..n {
        if in_degree[idx] == 0 {
            earliest_start[idx] = Some(graph.node_at(idx as NodeId).start);
            queue.push_back(idx as NodeId);
        }
    }

    let mut processed: Vec<NodeId> = Vec::with_capacity(n);
    // (earliest start, earliest finish), set once a task leaves the queue
    let mut earliest: Vec<Option<(DateTime<Utc>, DateTime<Utc>)>> = vec![None; n];

    while let Some(u) = queue.pop_front() {
        let u_idx = u as usize;
        processed.push(u);

        let u_node = graph.node_at(u);
        let u_start = earliest_start[u_idx].unwrap_or(u_node.start);
        let u_finish = u_start
            .checked_add_signed(u_node.duration)
            .ok_or_else(|| out_of_range(&u_node.id))?;
        earliest[u_idx] = Some((u_start, u_finish));
        log_debug!(
            verbosity,
            "Forward: {} earliest {} -> {}",
            u_node.id,
            u_start,
            u_finish
        );

        for &v in graph.successor_ids(u) {
            let v_idx = v as usize;
            let current = earliest_start[v_idx].unwrap_or(graph.node_at(v).start);
            earliest_start[v_idx] = Some(current.max(u_finish));

            in_degree[v_idx] -= 1;
            if in_degree[v_idx] == 0 {
                queue.push_back(v);
            }
        }
    }

    let unscheduled: Vec<String> = (0..n)
        .filter(|&idx| earliest[idx].is_none())
        .map(|idx| graph.node_at(idx as NodeId).id.clone())
        .collect();

    if !unscheduled.is_empty() {
        let task_ids = cycle_members(graph, &earliest);
        log_changes!(
            verbosity,
            "Circular dependency between [{}] leaves {} task(s) unscheduled",
            task_ids.join(", "),
            unscheduled.len()
        );
        if config.cycle_policy == CyclePolicy::Reject {
            return Err(ScheduleError::CircularDependency { task_ids });
        }
        log_checks!(verbosity, "Unscheduled tasks: {}", unscheduled.join(", "));
    }

    let project_start = earliest.iter().flatten().map(|&(start, _)| start).min();
    let Some(project_end) = earliest.iter().flatten().map(|&(_, finish)| finish).max() else {
        return Ok(CriticalPathResult {
            unscheduled,
            ..Default::default()
        });
    };

    // Backward pass: latest start/finish in reverse processed order, so every
    // scheduled successor is final before its predecessors are visited
    let mut latest_start: Vec<Option<DateTime<Utc>>> = vec![None; n];
    let mut task_timings: FxHashMap<String, TaskTiming> =
        FxHashMap::with_capacity_and_hasher(processed.len(), Default::default());
    let mut critical_path_tasks = FxHashSet::default();

    for &u in processed.iter().rev() {
        let u_idx = u as usize;
        let node = graph.node_at(u);
        let successors = graph.successor_ids(u);
        let Some((u_earliest_start, u_earliest_finish)) = earliest[u_idx] else {
            continue;
        };

        let latest_finish = successors
            .iter()
            .filter_map(|&v| latest_start[v as usize])
            .min()
            .unwrap_or(project_end);
        let u_latest_start = latest_finish
            .checked_sub_signed(node.duration)
            .ok_or_else(|| out_of_range(&node.id))?;
        latest_start[u_idx] = Some(u_latest_start);

        let free_slack = successors
            .iter()
            .filter_map(|&v| earliest[v as usize].map(|(start, _)| start))
            .min()
            .unwrap_or(project_end)
            - u_earliest_finish;

        let timing = TaskTiming {
            earliest_start: u_earliest_start,
            earliest_finish: u_earliest_finish,
            latest_start: u_latest_start,
            latest_finish,
            slack: u_latest_start - u_earliest_start,
            free_slack,
        };
        log_debug!(
            verbosity,
            "Backward: {} latest {} -> {}, slack {}s",
            node.id,
            timing.latest_start,
            timing.latest_finish,
            timing.slack.num_seconds()
        );

        if timing.is_critical(config.critical_epsilon) {
            critical_path_tasks.insert(node.id.clone());
        }
        task_timings.insert(node.id.clone(), timing);
    }

    log_changes!(
        verbosity,
        "Critical path: {} of {} task(s) scheduled, {} critical, project ends {}",
        processed.len(),
        n,
        critical_path_tasks.len(),
        project_end
    );

    Ok(CriticalPathResult {
        task_timings,
        critical_path_tasks,
        processed_order: processed
            .iter()
            .map(|&id| graph.node_at(id).id.clone())
            .collect(),
        unscheduled,
        project_start,
        project_end: Some(project_end),
    })
}

fn out_of_range(task_id: &str) -> ScheduleError {
    ScheduleError::TimeOutOfRange {
        task_id: task_id.to_string(),
    }
}

/// Narrow the tasks the forward pass never reached down to those on a cycle
/// (or between cycles), by repeatedly peeling residual tasks that have no
/// residual successors. Returned in input order.
fn cycle_members(
    graph: &TaskGraph,
    earliest: &[Option<(DateTime<Utc>, DateTime<Utc>)>],
) -> Vec<String> {
    let n = graph.len();
    let dequeued: Vec<bool> = earliest.iter().map(Option::is_some).collect();
    let mut out_degree: Vec<usize> = (0..n)
        .map(|idx| {
            if dequeued[idx] {
                return 0;
            }
            graph
                .successor_ids(idx as NodeId)
                .iter()
                .filter(|&&v| !dequeued[v as usize])
                .count()
        })
        .collect();

    let mut peeled = dequeued.clone();
    let mut queue: VecDeque<NodeId> = (0..n)
        .filter(|&idx| !dequeued[idx] && out_degree[idx] == 0)
        .map(|idx| idx as NodeId)
        .collect();

    while let Some(v) = queue.pop_front() {
        peeled[v as usize] = true;
        for &u in graph.predecessor_ids(v) {
            let u_idx = u as usize;
            if peeled[u_idx] {
                continue;
            }
            out_degree[u_idx] -= 1;
            if out_degree[u_idx] == 0 {
                queue.push_back(u);
            }
        }
    }

    (0..n)
        .filter(|&idx| !peeled[idx])
        .map(|idx| graph.node_at(idx as NodeId).id.clone())
        .collect()
}
