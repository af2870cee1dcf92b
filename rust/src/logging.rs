//! Verbosity-gated logging macros for the scheduler.
//!
//! Messages go through the `tracing` facade; the host decides where they end
//! up by installing a subscriber. Verbosity levels:
//! - 0: SILENT (nothing beyond what the host subscriber asks for)
//! - 1: CHANGES (graph built, passes finished, cycles found)
//! - 2: CHECKS (dropped dependencies, unscheduled tasks)
//! - 3: DEBUG (per-node pass internals)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at CHANGES level (verbosity >= 1), emitted as `tracing::info!`.
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHANGES {
            ::tracing::info!($($arg)*);
        }
    };
}

/// Log at CHECKS level (verbosity >= 2), emitted as `tracing::debug!`.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CHECKS {
            ::tracing::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3), emitted as `tracing::trace!`.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            ::tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_silent_verbosity_emits_nothing() {
        let verbosity = VERBOSITY_SILENT;
        log_changes!(verbosity, "changes {}", 1);
        log_checks!(verbosity, "checks {}", 2);
        log_debug!(verbosity, "debug {}", 3);
        assert!(!logs_contain("changes 1"));
        assert!(!logs_contain("checks 2"));
        assert!(!logs_contain("debug 3"));
    }

    #[test]
    #[traced_test]
    fn test_levels_are_cumulative() {
        let verbosity = VERBOSITY_CHECKS;
        log_changes!(verbosity, "changes {}", 1);
        log_checks!(verbosity, "checks {}", 2);
        log_debug!(verbosity, "debug {}", 3);
        assert!(logs_contain("changes 1"));
        assert!(logs_contain("checks 2"));
        assert!(!logs_contain("debug 3"));
    }
}
