//! Orchestrator and process-elevation errors.

use core::fmt;
use std::io;

use crate::{SenderError, TimerError};

/// Error severity levels, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Recoverable by retrying the same step
    Warning = 1,
    /// The run cannot proceed without reconfiguration or re-initialization
    Error = 2,
    /// Real-time guarantees were lost
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Failures while raising the process to real-time execution.
#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    /// `mlockall` was refused.
    #[error("mlockall failed: {0}")]
    LockMemory(#[source] io::Error),
    /// The FIFO scheduling class could not be applied.
    #[error("Can't set the process scheduler to FIFO / set priority to {priority}: {source}")]
    Scheduler {
        /// Requested FIFO priority
        priority: i32,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
    /// The process could not be pinned to its core.
    #[error("Can't stick the process to CPU{core}: {source}")]
    Affinity {
        /// Requested core
        core: usize,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}

/// Failures reported by the real-time orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// No timer was configured.
    #[error("Null Timer provided")]
    MissingTimer,
    /// No sender was configured.
    #[error("Null Sender provided")]
    MissingSender,
    /// No payload callback was configured.
    #[error("Null user Function provided")]
    MissingCallback,
    /// No frequency was configured.
    #[error("Not provided frequency")]
    FrequencyUnset,
    /// `run` or `send_before_run` was called without a fresh `initialize`.
    #[error("System not initialized yet")]
    NotInitialized,
    /// Process elevation failed.
    #[error(transparent)]
    Elevation(#[from] ElevationError),
    /// The timer rejected its configuration.
    #[error("{0}")]
    Timer(#[from] TimerError),
    /// The sender failed to initialize or to accept a post.
    #[error("{0}")]
    Sender(#[from] SenderError),
    /// The pre-run handshake did not complete within its budget.
    #[error("Sender couldn't send the data in the given time limit ({limit_ms}ms)")]
    HandshakeTimeout {
        /// Budget that was exhausted
        limit_ms: u32,
    },
    /// The skip streak reached three seconds worth of ticks.
    #[error("The client disconnected ({skipped} consecutive ticks skipped)")]
    PeerDisconnected {
        /// Length of the skip streak
        skipped: u64,
    },
    /// The previous send did not finish within the tolerance window and
    /// skipping is disabled.
    #[error("Failed to send the data in the required time")]
    SendDeadline,
    /// The whole tick overran its period.
    #[error(
        "Failed to return from the sender object in the needed time - this bug related to the sender object not to the size of the payload ({0})"
    )]
    TickOverrun(#[source] TimerError),
}

impl SystemError {
    /// Get the error severity.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SystemError::MissingTimer
            | SystemError::MissingSender
            | SystemError::MissingCallback
            | SystemError::FrequencyUnset
            | SystemError::NotInitialized
            | SystemError::Timer(_)
            | SystemError::Sender(_) => ErrorSeverity::Error,
            SystemError::HandshakeTimeout { .. } => ErrorSeverity::Warning,
            SystemError::Elevation(_)
            | SystemError::PeerDisconnected { .. }
            | SystemError::SendDeadline
            | SystemError::TickOverrun(_) => ErrorSeverity::Critical,
        }
    }

    /// Whether a fresh `initialize` followed by `run` may succeed without
    /// changing the configuration.
    #[must_use]
    pub fn is_recoverable_by_restart(&self) -> bool {
        matches!(
            self,
            SystemError::HandshakeTimeout { .. }
                | SystemError::PeerDisconnected { .. }
                | SystemError::SendDeadline
                | SystemError::TickOverrun(_)
                | SystemError::Sender(_)
        )
    }
}

/// Result type for orchestrator operations.
pub type SystemResult<T = ()> = Result<T, SystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }

    #[test]
    fn test_configuration_errors_are_not_restartable() {
        assert!(!SystemError::MissingTimer.is_recoverable_by_restart());
        assert!(!SystemError::FrequencyUnset.is_recoverable_by_restart());
        assert_eq!(SystemError::MissingSender.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_runtime_failures_are_restartable() {
        assert!(SystemError::HandshakeTimeout { limit_ms: 100 }.is_recoverable_by_restart());
        assert!(SystemError::PeerDisconnected { skipped: 30 }.is_recoverable_by_restart());
        assert_eq!(
            SystemError::TickOverrun(TimerError::DeadlineMissed { late_ns: 1 }).severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_from_timer_error() {
        let err: SystemError = TimerError::ZeroFrequency.into();
        assert!(matches!(err, SystemError::Timer(TimerError::ZeroFrequency)));
        assert_eq!(err.to_string(), "The frequency must be greater than zero");
    }

    #[test]
    fn test_elevation_is_transparent() {
        let err: SystemError = ElevationError::Affinity {
            core: 0,
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
        .into();
        assert!(err.to_string().starts_with("Can't stick the process to CPU0"));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
