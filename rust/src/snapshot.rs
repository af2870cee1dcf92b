//! JSON codec for task store snapshots and schedule output.
//!
//! Instants travel as Unix milliseconds and field names are camelCase, the
//! shape the task store and timeline renderer already use.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use thiserror::Error;

use crate::config::SchedulerConfig;
use crate::critical_path::ScheduleError;
use crate::models::{Schedule, ScheduledTask, TaskRecord};
use crate::schedule_tasks;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to parse task snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Parse a JSON array of task records.
pub fn parse_tasks(json: &str) -> Result<Vec<TaskRecord>, SnapshotError> {
    Ok(serde_json::from_str(json)?)
}

pub fn read_tasks<R: Read>(reader: R) -> Result<Vec<TaskRecord>, SnapshotError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Schedule a JSON snapshot and render the annotated result as JSON.
pub fn schedule_json(json: &str, config: &SchedulerConfig) -> Result<String, SnapshotError> {
    let tasks = parse_tasks(json)?;
    let schedule = schedule_tasks(&tasks, config)?;
    Ok(serde_json::to_string(&ScheduleDto::from(&schedule))?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleDto<'a> {
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    project_start: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    project_end: Option<DateTime<Utc>>,
    critical_path: &'a [String],
    unscheduled: &'a [String],
    tasks: Vec<ScheduledTaskDto<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduledTaskDto<'a> {
    id: &'a str,
    start: i64,
    end: i64,
    duration_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    earliest_start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    earliest_finish: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    latest_finish: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slack_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    free_slack_ms: Option<i64>,
    is_critical: bool,
}

impl<'a> From<&'a Schedule> for ScheduleDto<'a> {
    fn from(schedule: &'a Schedule) -> Self {
        Self {
            project_start: schedule.project_start,
            project_end: schedule.project_end,
            critical_path: &schedule.critical_path,
            unscheduled: &schedule.unscheduled,
            tasks: schedule.tasks.iter().map(ScheduledTaskDto::from).collect(),
        }
    }
}

impl<'a> From<&'a ScheduledTask> for ScheduledTaskDto<'a> {
    fn from(task: &'a ScheduledTask) -> Self {
        let timing = task.timing.as_ref();
        Self {
            id: &task.id,
            start: task.start.timestamp_millis(),
            end: task.end.timestamp_millis(),
            duration_ms: task.duration.num_milliseconds(),
            earliest_start: timing.map(|t| t.earliest_start.timestamp_millis()),
            earliest_finish: timing.map(|t| t.earliest_finish.timestamp_millis()),
            latest_start: timing.map(|t| t.latest_start.timestamp_millis()),
            latest_finish: timing.map(|t| t.latest_finish.timestamp_millis()),
            slack_ms: timing.map(|t| t.slack.num_milliseconds()),
            free_slack_ms: timing.map(|t| t.free_slack.num_milliseconds()),
            is_critical: task.is_critical,
        }
    }
}
