//! Critical path scheduling.
//!
//! Runs the classic CPM forward pass (earliest times, Kahn's order) and
//! backward pass (latest times, reversed order) over a `TaskGraph`, then
//! classifies tasks with zero slack as critical.

mod calculation;
mod types;

pub use calculation::{calculate_critical_path, CriticalPathResult, ScheduleError};
pub use types::TaskTiming;
