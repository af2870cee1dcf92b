//! Configuration types for the scheduler.

use chrono::Duration;
use serde::Deserialize;
use thiserror::Error;

/// Configuration values that would make a run meaningless.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Critical epsilon must be positive, got {0} ms")]
    NonPositiveEpsilon(i64),
    #[error("Critical epsilon of {0} ms is out of range")]
    EpsilonOutOfRange(i64),
    #[error("Critical epsilon must be a positive, finite number of seconds, got {0}")]
    InvalidEpsilonSecs(String),
}

/// What to do when the dependency graph contains a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CyclePolicy {
    /// Leave tasks that never become ready without timings and report them
    /// as unscheduled.
    #[default]
    Degrade,
    /// Fail the run with `ScheduleError::CircularDependency`.
    Reject,
}

/// Configuration for a critical path run.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawSchedulerConfig")]
pub struct SchedulerConfig {
    /// Slack below this magnitude counts as zero. Absorbs sub-minute drift in
    /// instants coming from the task store.
    pub critical_epsilon: Duration,
    /// Cycle handling.
    pub cycle_policy: CyclePolicy,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            critical_epsilon: Duration::seconds(60),
            cycle_policy: CyclePolicy::Degrade,
            verbosity: 0,
        }
    }
}

impl SchedulerConfig {
    /// Check the values a run depends on; a non-positive epsilon would leave
    /// no task critical.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.critical_epsilon <= Duration::zero() {
            return Err(ConfigError::NonPositiveEpsilon(
                self.critical_epsilon.num_milliseconds(),
            ));
        }
        Ok(())
    }

    /// Convert a host-supplied epsilon in seconds, rejecting NaN, infinities
    /// and anything under a millisecond.
    pub fn epsilon_from_secs(secs: f64) -> Result<Duration, ConfigError> {
        let ms = secs * 1000.0;
        if !ms.is_finite() || ms < 1.0 || ms > i64::MAX as f64 {
            return Err(ConfigError::InvalidEpsilonSecs(secs.to_string()));
        }
        Duration::try_milliseconds(ms as i64)
            .ok_or_else(|| ConfigError::InvalidEpsilonSecs(secs.to_string()))
    }

    pub fn with_critical_epsilon(mut self, epsilon: Duration) -> Self {
        self.critical_epsilon = epsilon;
        self
    }

    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Wire shape of `SchedulerConfig`; every field is optional.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchedulerConfig {
    critical_epsilon_ms: Option<i64>,
    cycle_policy: Option<CyclePolicy>,
    verbosity: Option<u8>,
}

impl TryFrom<RawSchedulerConfig> for SchedulerConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSchedulerConfig) -> Result<Self, Self::Error> {
        let defaults = Self::default();
        let critical_epsilon = match raw.critical_epsilon_ms {
            Some(ms) => {
                Duration::try_milliseconds(ms).ok_or(ConfigError::EpsilonOutOfRange(ms))?
            }
            None => defaults.critical_epsilon,
        };
        let config = Self {
            critical_epsilon,
            cycle_policy: raw.cycle_policy.unwrap_or(defaults.cycle_policy),
            verbosity: raw.verbosity.unwrap_or(defaults.verbosity),
        };
        config.validate()?;
        Ok(config)
    }
}
