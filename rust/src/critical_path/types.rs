//! Types for critical path scheduling.

use chrono::{DateTime, Duration, Utc};

/// Per-task timing computed by the forward and backward passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskTiming {
    /// Earliest possible start (forward pass).
    pub earliest_start: DateTime<Utc>,
    /// `earliest_start + duration`.
    pub earliest_finish: DateTime<Utc>,
    /// Latest allowable start (backward pass).
    pub latest_start: DateTime<Utc>,
    /// Latest allowable finish (backward pass).
    pub latest_finish: DateTime<Utc>,
    /// Total float: `latest_start - earliest_start`.
    pub slack: Duration,
    /// How far the task can slip without delaying any successor's earliest start.
    pub free_slack: Duration,
}

impl TaskTiming {
    /// Zero slack within `epsilon` either way.
    pub fn is_critical(&self, epsilon: Duration) -> bool {
        self.slack < epsilon && self.slack > -epsilon
    }
}
