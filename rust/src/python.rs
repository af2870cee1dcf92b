//! PyO3 bindings, built with the `python` feature.

use chrono::{DateTime, Duration, Utc};
use pyo3::prelude::*;

use crate::config::{CyclePolicy, SchedulerConfig};
use crate::models::{ScheduledTask, TaskRecord};
use crate::schedule_tasks;

/// Task record as passed in from Python.
#[pyclass(name = "TaskRecord")]
#[derive(Clone, Debug)]
pub struct PyTaskRecord {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub start: DateTime<Utc>,
    #[pyo3(get, set)]
    pub end: DateTime<Utc>,
    #[pyo3(get, set)]
    pub dependencies: Vec<String>,
}

#[pymethods]
impl PyTaskRecord {
    #[new]
    #[pyo3(signature = (id, start, end, dependencies=Vec::new()))]
    fn new(id: String, start: DateTime<Utc>, end: DateTime<Utc>, dependencies: Vec<String>) -> Self {
        Self {
            id,
            start,
            end,
            dependencies,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskRecord(id={:?}, start={}, end={}, deps={})",
            self.id,
            self.start,
            self.end,
            self.dependencies.len()
        )
    }
}

impl From<PyTaskRecord> for TaskRecord {
    fn from(record: PyTaskRecord) -> Self {
        Self {
            id: record.id,
            start: record.start,
            end: record.end,
            dependencies: record.dependencies,
        }
    }
}

/// Scheduled task returned to Python. Timing fields are `None` for tasks
/// without a computed schedule.
#[pyclass(name = "ScheduledTask")]
#[derive(Clone, Debug)]
pub struct PyScheduledTask {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub start: DateTime<Utc>,
    #[pyo3(get)]
    pub end: DateTime<Utc>,
    #[pyo3(get)]
    pub earliest_start: Option<DateTime<Utc>>,
    #[pyo3(get)]
    pub earliest_finish: Option<DateTime<Utc>>,
    #[pyo3(get)]
    pub latest_start: Option<DateTime<Utc>>,
    #[pyo3(get)]
    pub latest_finish: Option<DateTime<Utc>>,
    #[pyo3(get)]
    pub slack_secs: Option<f64>,
    #[pyo3(get)]
    pub is_critical: bool,
}

#[pymethods]
impl PyScheduledTask {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledTask(id={:?}, earliest_start={:?}, critical={})",
            self.id, self.earliest_start, self.is_critical
        )
    }
}

impl From<ScheduledTask> for PyScheduledTask {
    fn from(task: ScheduledTask) -> Self {
        let timing = task.timing.as_ref();
        Self {
            earliest_start: timing.map(|t| t.earliest_start),
            earliest_finish: timing.map(|t| t.earliest_finish),
            latest_start: timing.map(|t| t.latest_start),
            latest_finish: timing.map(|t| t.latest_finish),
            slack_secs: timing.map(|t| t.slack.num_milliseconds() as f64 / 1000.0),
            is_critical: task.is_critical,
            id: task.id,
            start: task.start,
            end: task.end,
        }
    }
}

/// Run the critical path passes over a task snapshot.
///
/// # Raises
/// * ValueError on duplicate or empty ids, a non-positive or non-finite
///   `critical_epsilon_secs`, instants past the representable range, or a
///   cycle when `reject_cycles` is set
#[pyfunction]
#[pyo3(signature = (tasks, critical_epsilon_secs=60.0, reject_cycles=false, verbosity=0))]
fn schedule(
    tasks: Vec<PyTaskRecord>,
    critical_epsilon_secs: f64,
    reject_cycles: bool,
    verbosity: u8,
) -> PyResult<Vec<PyScheduledTask>> {
    let critical_epsilon = SchedulerConfig::epsilon_from_secs(critical_epsilon_secs)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
    let cycle_policy = if reject_cycles {
        CyclePolicy::Reject
    } else {
        CyclePolicy::Degrade
    };
    let config = SchedulerConfig::default()
        .with_critical_epsilon(critical_epsilon)
        .with_cycle_policy(cycle_policy)
        .with_verbosity(verbosity);
    let records: Vec<TaskRecord> = tasks.into_iter().map(TaskRecord::from).collect();

    match schedule_tasks(&records, &config) {
        Ok(result) => Ok(result.tasks.into_iter().map(PyScheduledTask::from).collect()),
        Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
    }
}

/// The `activity_gantt` Python module.
#[pymodule]
fn activity_gantt(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTaskRecord>()?;
    m.add_class::<PyScheduledTask>()?;
    m.add_function(wrap_pyfunction!(schedule, m)?)?;
    Ok(())
}
